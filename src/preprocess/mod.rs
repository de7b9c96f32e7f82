// Text preprocessing — the deterministic cleaning chain applied to every
// post body and comment before topic modeling and sentiment scoring.

pub mod contractions;
pub mod lemma;
pub mod normalize;

pub use lemma::PosTag;
pub use normalize::{NormalizedText, StemMode, TextNormalizer};
