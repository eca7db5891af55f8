//! Strict positional parsing of solver answers.
//!
//! The protocol has no request ids and no field labels; every answer is a
//! whitespace-separated run of numbers whose meaning is fixed by the
//! command that elicited it. A malformed numeric field is fatal for the
//! computation that issued the command, never for the process.

use thiserror::Error;

/// Parse failure for a solver answer.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The answer contained no fields at all.
    #[error("empty solver answer")]
    EmptyAnswer,

    /// A field failed to parse as a number.
    #[error("malformed numeric field {field:?} in solver answer {answer:?}")]
    MalformedField { answer: String, field: String },

    /// The answer had fewer fields than the protocol requires here.
    #[error("solver answer {answer:?} has {got} fields, expected at least {expected}")]
    MissingFields {
        answer: String,
        expected: usize,
        got: usize,
    },
}

/// Parse a `GET_FINAL_TIMES` answer.
///
/// The answer is a run of whitespace-separated floats; only the last one -
/// the total ascent time in seconds - matters for sequencing.
pub fn parse_final_times(answer: &str) -> Result<f64, ResponseError> {
    let field = answer
        .split_whitespace()
        .last()
        .ok_or(ResponseError::EmptyAnswer)?;
    parse_field(answer, field)
}

/// Parse every field of an answer as a float, requiring at least
/// `min_fields` of them.
pub fn parse_floats(answer: &str, min_fields: usize) -> Result<Vec<f64>, ResponseError> {
    let fields: Vec<f64> = answer
        .split_whitespace()
        .map(|field| parse_field(answer, field))
        .collect::<Result<_, _>>()?;
    if fields.len() < min_fields {
        return Err(ResponseError::MissingFields {
            answer: answer.to_string(),
            expected: min_fields,
            got: fields.len(),
        });
    }
    Ok(fields)
}

fn parse_field(answer: &str, field: &str) -> Result<f64, ResponseError> {
    field
        .parse()
        .map_err(|_| ResponseError::MalformedField {
            answer: answer.to_string(),
            field: field.to_string(),
        })
}
