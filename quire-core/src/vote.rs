//! Like/dislike transitions
//!
//! A user is either in a target's like set, its dislike set, or neither.
//! Voting the same way twice withdraws the vote; voting the other way moves
//! the user across.

use std::fmt;
use std::str::FromStr;

/// What the user asked for (`add_like` / `add_dislike` in URLs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Like,
    Dislike,
}

impl VoteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "add_like",
            Self::Dislike => "add_dislike",
        }
    }
}

impl FromStr for VoteAction {
    type Err = UnknownVote;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add_like" => Ok(Self::Like),
            "add_dislike" => Ok(Self::Dislike),
            other => Err(UnknownVote(other.to_owned())),
        }
    }
}

impl fmt::Display for VoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of object a vote is attached to (`post` / `comment` in URLs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Post,
    Comment,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

impl FromStr for TargetKind {
    type Err = UnknownVote;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(Self::Post),
            "comment" => Ok(Self::Comment),
            other => Err(UnknownVote(other.to_owned())),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised action or target segment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vote segment '{0}'")]
pub struct UnknownVote(pub String);

/// A user's current standing on one target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Membership {
    pub liked: bool,
    pub disliked: bool,
}

/// Change to a single user set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetChange {
    Keep,
    Add,
    Remove,
}

/// Changes to apply to the like and dislike sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub like: SetChange,
    pub dislike: SetChange,
}

impl Membership {
    /// Decide the set changes for `action`.
    pub fn toggle(self, action: VoteAction) -> VoteOutcome {
        let (mine, other) = match action {
            VoteAction::Like => (self.liked, self.disliked),
            VoteAction::Dislike => (self.disliked, self.liked),
        };

        let (mine, other) = if mine {
            (SetChange::Remove, SetChange::Keep)
        } else if other {
            (SetChange::Add, SetChange::Remove)
        } else {
            (SetChange::Add, SetChange::Keep)
        };

        match action {
            VoteAction::Like => VoteOutcome { like: mine, dislike: other },
            VoteAction::Dislike => VoteOutcome { like: other, dislike: mine },
        }
    }

    /// Membership after applying `outcome`.
    pub fn apply(self, outcome: VoteOutcome) -> Membership {
        fn step(current: bool, change: SetChange) -> bool {
            match change {
                SetChange::Keep => current,
                SetChange::Add => true,
                SetChange::Remove => false,
            }
        }

        Membership {
            liked: step(self.liked, outcome.like),
            disliked: step(self.disliked, outcome.dislike),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEITHER: Membership = Membership { liked: false, disliked: false };
    const LIKED: Membership = Membership { liked: true, disliked: false };
    const DISLIKED: Membership = Membership { liked: false, disliked: true };

    fn vote(m: Membership, action: VoteAction) -> Membership {
        m.apply(m.toggle(action))
    }

    #[test]
    fn like_from_nothing() {
        assert_eq!(vote(NEITHER, VoteAction::Like), LIKED);
        assert_eq!(
            NEITHER.toggle(VoteAction::Like),
            VoteOutcome { like: SetChange::Add, dislike: SetChange::Keep }
        );
    }

    #[test]
    fn like_twice_withdraws() {
        assert_eq!(vote(LIKED, VoteAction::Like), NEITHER);
        assert_eq!(vote(DISLIKED, VoteAction::Dislike), NEITHER);
        assert_eq!(vote(vote(NEITHER, VoteAction::Like), VoteAction::Like), NEITHER);
        assert_eq!(vote(vote(NEITHER, VoteAction::Dislike), VoteAction::Dislike), NEITHER);
    }

    #[test]
    fn like_moves_user_out_of_dislikes() {
        assert_eq!(vote(DISLIKED, VoteAction::Like), LIKED);
        assert_eq!(
            DISLIKED.toggle(VoteAction::Like),
            VoteOutcome { like: SetChange::Add, dislike: SetChange::Remove }
        );
        assert_eq!(vote(LIKED, VoteAction::Dislike), DISLIKED);
    }

    #[test]
    fn never_in_both_sets() {
        for start in [NEITHER, LIKED, DISLIKED] {
            for action in [VoteAction::Like, VoteAction::Dislike] {
                let after = vote(start, action);
                assert!(!(after.liked && after.disliked));
            }
        }
    }

    #[test]
    fn parses_url_segments() {
        assert_eq!("add_like".parse::<VoteAction>().unwrap(), VoteAction::Like);
        assert_eq!("add_dislike".parse::<VoteAction>().unwrap(), VoteAction::Dislike);
        assert!("like".parse::<VoteAction>().is_err());

        assert_eq!("post".parse::<TargetKind>().unwrap(), TargetKind::Post);
        assert_eq!("comment".parse::<TargetKind>().unwrap(), TargetKind::Comment);
        assert_eq!(
            "user".parse::<TargetKind>().unwrap_err(),
            UnknownVote("user".into())
        );
    }
}
