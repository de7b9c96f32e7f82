use std::fmt;
use std::str::FromStr;

/// Which post fields (and optionally the parent comment) form the
/// comparison target for relevance scoring.
///
/// Modes without `Parent` share one target per post group; parent modes
/// build a per-row target because each comment has its own parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparedWith {
    Title,
    Body,
    #[default]
    TitleBody,
    Parent,
    TitleParent,
    BodyParent,
    TitleBodyParent,
}

impl ComparedWith {
    pub fn includes_title(&self) -> bool {
        matches!(
            self,
            ComparedWith::Title
                | ComparedWith::TitleBody
                | ComparedWith::TitleParent
                | ComparedWith::TitleBodyParent
        )
    }

    pub fn includes_body(&self) -> bool {
        matches!(
            self,
            ComparedWith::Body
                | ComparedWith::TitleBody
                | ComparedWith::BodyParent
                | ComparedWith::TitleBodyParent
        )
    }

    pub fn includes_parent(&self) -> bool {
        matches!(
            self,
            ComparedWith::Parent
                | ComparedWith::TitleParent
                | ComparedWith::BodyParent
                | ComparedWith::TitleBodyParent
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparedWith::Title => "title",
            ComparedWith::Body => "body",
            ComparedWith::TitleBody => "title-body",
            ComparedWith::Parent => "parent",
            ComparedWith::TitleParent => "title-parent",
            ComparedWith::BodyParent => "body-parent",
            ComparedWith::TitleBodyParent => "title-body-parent",
        }
    }
}

impl fmt::Display for ComparedWith {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparedWith {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(ComparedWith::Title),
            "body" => Ok(ComparedWith::Body),
            "title-body" => Ok(ComparedWith::TitleBody),
            "parent" => Ok(ComparedWith::Parent),
            "title-parent" => Ok(ComparedWith::TitleParent),
            "body-parent" => Ok(ComparedWith::BodyParent),
            "title-body-parent" => Ok(ComparedWith::TitleBodyParent),
            other => Err(format!(
                "unknown comparison mode `{other}` (expected title, body, title-body, \
                 parent, title-parent, body-parent, or title-body-parent)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_modes_round_trip() {
        let modes = [
            ComparedWith::Title,
            ComparedWith::Body,
            ComparedWith::TitleBody,
            ComparedWith::Parent,
            ComparedWith::TitleParent,
            ComparedWith::BodyParent,
            ComparedWith::TitleBodyParent,
        ];
        for mode in modes {
            assert_eq!(mode.as_str().parse::<ComparedWith>().unwrap(), mode);
        }
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!("title_body".parse::<ComparedWith>().is_err());
        assert!("".parse::<ComparedWith>().is_err());
    }

    #[test]
    fn test_component_flags() {
        assert!(ComparedWith::TitleBodyParent.includes_title());
        assert!(ComparedWith::TitleBodyParent.includes_body());
        assert!(ComparedWith::TitleBodyParent.includes_parent());
        assert!(!ComparedWith::Parent.includes_title());
        assert!(!ComparedWith::Parent.includes_body());
        assert!(!ComparedWith::Title.includes_parent());
    }

    #[test]
    fn test_default_is_title_body() {
        assert_eq!(ComparedWith::default(), ComparedWith::TitleBody);
    }
}
