use crate::prelude::*;
use serde::de::Deserialize as _;
use std::convert::TryFrom as _;

// matches javascript's encodeURIComponent, which is what voting servers
// built for browser clients expect
const CANDIDATE_ENCODE_SET: &percent_encoding::AsciiSet =
    &percent_encoding::NON_ALPHANUMERIC
        .remove(b'-')
        .remove(b'_')
        .remove(b'.')
        .remove(b'!')
        .remove(b'~')
        .remove(b'*')
        .remove(b'\'')
        .remove(b'(')
        .remove(b')');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStatus {
    Waiting,
    Voting { seconds_remaining: u64 },
    Ended,
}

impl PhaseStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Voting { .. } => "voting",
            Self::Ended => "ended",
        }
    }
}

impl std::convert::TryFrom<&str> for PhaseStatus {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut parts = s.splitn(2, '|');
        let phase = parts.next().unwrap_or("");
        match phase {
            "waiting" => Ok(Self::Waiting),
            "ended" => Ok(Self::Ended),
            "voting" => {
                let secs = parts
                    .next()
                    .context(crate::error::ParseStatus { status: s })?
                    .trim();
                let secs: i64 = secs.parse().context(
                    crate::error::ParseSecondsRemaining { input: secs },
                )?;
                // a server that overshoots the deadline can report a
                // negative value, which we never want to display
                let seconds_remaining = if secs < 0 { 0 } else { secs as u64 };
                Ok(Self::Voting { seconds_remaining })
            }
            _ => Err(Error::ParseStatus {
                status: s.to_string(),
            }),
        }
    }
}

impl std::str::FromStr for PhaseStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_from(s)
    }
}

// minutes aren't capped at two digits, so an hour long vote shows 60:00
pub fn format_countdown(seconds_remaining: u64) -> String {
    format!("{:02}:{:02}", seconds_remaining / 60, seconds_remaining % 60)
}

/// Vote counts in the order the server listed the candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally(Vec<(String, u64)>);

impl Tally {
    #[cfg(test)]
    pub fn new(votes: &[(&str, u64)]) -> Self {
        Self(
            votes
                .iter()
                .map(|(name, count)| ((*name).to_string(), *count))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // counts come straight from the server, so this must not overflow
    pub fn total(&self) -> u64 {
        self.0
            .iter()
            .fold(0, |total: u64, (_, count)| total.saturating_add(*count))
    }
}

impl<'a> serde::Deserialize<'a> for Tally {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'a>,
    {
        struct TallyVisitor;

        impl<'a> serde::de::Visitor<'a> for TallyVisitor {
            type Value = Tally;

            fn expecting(
                &self,
                formatter: &mut std::fmt::Formatter,
            ) -> std::fmt::Result {
                formatter.write_str("map of candidate names to vote counts")
            }

            fn visit_map<A>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error>
            where
                A: serde::de::MapAccess<'a>,
            {
                let mut votes: Vec<(String, u64)> = vec![];
                while let Some((name, count)) = map.next_entry()? {
                    if votes.iter().any(|(seen, _)| *seen == name) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate candidate '{}'",
                            name
                        )));
                    }
                    votes.push((name, count));
                }
                Ok(Tally(votes))
            }
        }

        deserializer.deserialize_map(TallyVisitor)
    }
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LiveTally {
    pub votes: Tally,
}

impl LiveTally {
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .context(crate::error::ParseJson { endpoint: "/stats" })
    }
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FinalTally {
    #[serde(default, deserialize_with = "winner")]
    pub winner: Option<String>,
    pub votes: Tally,
}

impl FinalTally {
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .context(crate::error::ParseJson { endpoint: "/results" })
    }
}

// servers report "no winner" as null, as an empty string, or by leaving the
// field out entirely
fn winner<'a, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::de::Deserializer<'a>,
{
    Ok(<Option<String>>::deserialize(deserializer)?
        .filter(|name| !name.trim().is_empty()))
}

/// A participant's single ballot, ready to be posted to `/vote`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ballot {
    client_id: String,
    candidate: String,
}

impl Ballot {
    pub fn new(client_id: &str, candidate: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            candidate: candidate.to_string(),
        }
    }

    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    // the identifier goes first as a bare token, not as a key=value pair
    pub fn body(&self) -> String {
        format!(
            "{}&candidate={}",
            self.client_id,
            percent_encoding::utf8_percent_encode(
                &self.candidate,
                CANDIDATE_ENCODE_SET
            )
        )
    }
}
