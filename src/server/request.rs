use crate::core::error::{Error, ErrorKind, Result};

/// Most whitespace-separated tokens a request line may carry.
pub const MAX_ARGS: usize = 64;

/// A parsed search request.
///
/// The wire form is one line: query words mixed with options, where
/// `-n COUNT` caps the result count and `-m NAME` restricts matches to
/// occurrences tagged with that meta name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub words: Vec<String>,
    pub max_results: Option<usize>,
    pub meta: Option<String>,
}

impl Request {
    pub fn parse(line: &str) -> Result<Request> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() > MAX_ARGS {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("request has more than {MAX_ARGS} tokens"),
            ));
        }

        let mut request = Request {
            words: Vec::new(),
            max_results: None,
            meta: None,
        };
        let mut iter = tokens.into_iter();
        while let Some(token) = iter.next() {
            match token {
                "-n" => {
                    let value = iter.next().ok_or_else(|| {
                        Error::new(ErrorKind::InvalidArgument, "-n needs a count".to_string())
                    })?;
                    let count: usize = value.parse().map_err(|_| {
                        Error::new(
                            ErrorKind::InvalidArgument,
                            format!("bad result count {value:?}"),
                        )
                    })?;
                    request.max_results = Some(count);
                }
                "-m" => {
                    let value = iter.next().ok_or_else(|| {
                        Error::new(ErrorKind::InvalidArgument, "-m needs a meta name".to_string())
                    })?;
                    request.meta = Some(value.to_string());
                }
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(Error::new(
                        ErrorKind::InvalidArgument,
                        format!("unknown option {flag:?}"),
                    ));
                }
                word => request.words.push(word.to_string()),
            }
        }

        if request.words.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "request carries no query words".to_string(),
            ));
        }
        Ok(request)
    }
}
