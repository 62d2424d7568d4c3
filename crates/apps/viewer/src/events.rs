use foundation::LatLon;

/// One line of `access-map watch` input.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    Move(LatLon),
    Zoom(u8),
    Locate,
    Report {
        issue_type: String,
        description: String,
    },
    Show,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseEventError {
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid {field}: {value:?}")]
    Invalid { field: &'static str, value: String },
}

impl WatchEvent {
    /// Parses one input line. Blank lines and `#` comments yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseEventError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(None);
        };
        let event = match command {
            "move" => {
                let lat = number(words.next(), "latitude")?;
                let lon = number(words.next(), "longitude")?;
                Self::Move(LatLon::new(lat, lon))
            }
            "zoom" => Self::Zoom(number(words.next(), "zoom")?),
            "locate" => Self::Locate,
            "report" => {
                let issue_type = words
                    .next()
                    .ok_or(ParseEventError::Missing("issue type"))?
                    .to_string();
                let description = words.collect::<Vec<_>>().join(" ");
                Self::Report {
                    issue_type,
                    description,
                }
            }
            "show" => Self::Show,
            "quit" | "exit" => Self::Quit,
            other => return Err(ParseEventError::Unknown(other.to_string())),
        };
        Ok(Some(event))
    }
}

fn number<T: std::str::FromStr>(
    word: Option<&str>,
    field: &'static str,
) -> Result<T, ParseEventError> {
    let word = word.ok_or(ParseEventError::Missing(field))?;
    word.parse().map_err(|_| ParseEventError::Invalid {
        field,
        value: word.to_string(),
    })
}
