use std::fmt::{Display, Formatter};

use nom::error::{ErrorKind, ParseError};
use nom::InputLength;

/// Decode failure shared by every dissector in the workspace
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Buffer is shorter than a field's fixed or declared length
    TruncatedInput { needed: usize, available: usize },
    /// A declared length value is internally inconsistent
    MalformedHeader(&'static str),
    /// Any other combinator failure
    Nom(ErrorKind),
}

impl Error {
    /// Fail unless `buf` holds at least `needed` bytes
    #[inline]
    pub fn check_len(buf: &[u8], needed: usize) -> Result<(), Error> {
        if buf.len() < needed {
            return Err(Error::TruncatedInput {
                needed,
                available: buf.len(),
            });
        }
        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TruncatedInput { needed, available } => write!(
                f,
                "Truncated input, needed {} bytes, available {} bytes",
                needed, available
            ),
            Error::MalformedHeader(s) => write!(f, "Malformed header: {}", s),
            Error::Nom(kind) => write!(f, "Nom parse error({:?})", kind),
        }
    }
}

impl std::error::Error for Error {}

impl<I: InputLength> ParseError<I> for Error {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        match kind {
            // complete combinators report a short buffer as Eof
            ErrorKind::Eof => Error::TruncatedInput {
                needed: input.input_len() + 1,
                available: input.input_len(),
            },
            _ => Error::Nom(kind),
        }
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<Error>> for Error {
    fn from(e: nom::Err<Error>) -> Self {
        match e {
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
            nom::Err::Incomplete(needed) => {
                let needed = match needed {
                    nom::Needed::Unknown => 1,
                    nom::Needed::Size(n) => n.get(),
                };
                Error::TruncatedInput {
                    needed,
                    available: 0,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use nom::number::complete::be_u16;
    use nom::IResult;

    use super::*;

    fn two(buf: &[u8]) -> IResult<&[u8], u16, Error> {
        be_u16(buf)
    }

    #[test]
    fn short_buffer_is_truncated_input() {
        let buf = [0x01];
        let err: Error = two(&buf).unwrap_err().into();
        assert!(matches!(err, Error::TruncatedInput { .. }));
    }

    #[test]
    fn check_len() {
        assert!(Error::check_len(&[0; 4], 4).is_ok());
        assert_eq!(
            Error::check_len(&[0; 3], 4),
            Err(Error::TruncatedInput {
                needed: 4,
                available: 3
            })
        );
    }

    #[test]
    fn display() {
        let e = Error::MalformedHeader("tcp header length exceeds segment length");
        assert_eq!(
            e.to_string(),
            "Malformed header: tcp header length exceeds segment length"
        );
    }
}
