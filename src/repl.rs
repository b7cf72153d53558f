//! Command Loop
//!
//! Line-oriented command surface over the query engine, one command per
//! line on standard input:
//!
//! ```text
//! get <user_id> <ad_id> <query_id> <position> <depth>
//! clicked <user_id>
//! impressed <user_id> <user_id>
//! profit <ad_id> <ctr_threshold>
//! quit
//! ```
//!
//! Results go to standard output. An unrecognized command or a propagated
//! query error terminates the loop with that error; `quit` and end of
//! input terminate it cleanly.

use crate::query::{QueryEngine, QueryError, QueryResult};
use nom::{
    bytes::complete::take_while1,
    character::complete::{char, digit1, multispace1},
    combinator::{map_res, opt, recognize},
    sequence::{pair, preceded},
    IResult,
};
use std::io::{BufRead, Write};

/// One parsed command line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Get {
        user_id: u32,
        ad_id: u32,
        query_id: u32,
        position: u8,
        depth: u8,
    },
    Clicked {
        user_id: u32,
    },
    Impressed {
        user_a: u32,
        user_b: u32,
    },
    Profit {
        ad_id: u32,
        ctr_threshold: f64,
    },
    Quit,
}

/// Parse one command line
pub fn parse_command(input: &str) -> QueryResult<Command> {
    let input = input.trim();
    let (rest, word) = command_word(input)
        .map_err(|_| QueryError::Parse(format!("expected a command word in {input:?}")))?;

    let parsed = match word {
        "get" => command_get(rest),
        "clicked" => command_clicked(rest),
        "impressed" => command_impressed(rest),
        "profit" => command_profit(rest),
        "quit" | "exit" => Ok((rest, Command::Quit)),
        other => return Err(QueryError::UnknownCommand(other.to_string())),
    };

    match parsed {
        Ok((rest, command)) if rest.trim().is_empty() => Ok(command),
        Ok((rest, _)) => Err(QueryError::Parse(format!(
            "unexpected trailing input: {:?}",
            rest.trim()
        ))),
        Err(_) => Err(QueryError::Parse(format!(
            "bad arguments for {word:?}: {:?}",
            rest.trim()
        ))),
    }
}

fn command_word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphabetic())(input)
}

fn command_get(input: &str) -> IResult<&str, Command> {
    let (input, user_id) = preceded(multispace1, number::<u32>)(input)?;
    let (input, ad_id) = preceded(multispace1, number::<u32>)(input)?;
    let (input, query_id) = preceded(multispace1, number::<u32>)(input)?;
    let (input, position) = preceded(multispace1, number::<u8>)(input)?;
    let (input, depth) = preceded(multispace1, number::<u8>)(input)?;

    Ok((
        input,
        Command::Get {
            user_id,
            ad_id,
            query_id,
            position,
            depth,
        },
    ))
}

fn command_clicked(input: &str) -> IResult<&str, Command> {
    let (input, user_id) = preceded(multispace1, number::<u32>)(input)?;
    Ok((input, Command::Clicked { user_id }))
}

fn command_impressed(input: &str) -> IResult<&str, Command> {
    let (input, user_a) = preceded(multispace1, number::<u32>)(input)?;
    let (input, user_b) = preceded(multispace1, number::<u32>)(input)?;
    Ok((input, Command::Impressed { user_a, user_b }))
}

fn command_profit(input: &str) -> IResult<&str, Command> {
    let (input, ad_id) = preceded(multispace1, number::<u32>)(input)?;
    let (input, ctr_threshold) = preceded(multispace1, decimal)(input)?;
    Ok((
        input,
        Command::Profit {
            ad_id,
            ctr_threshold,
        },
    ))
}

/// Parse an unsigned decimal integer
fn number<T: std::str::FromStr>(input: &str) -> IResult<&str, T> {
    map_res(digit1, str::parse)(input)
}

/// Parse a non-negative decimal number like `0.35` or `1`
fn decimal(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        str::parse,
    )(input)
}

/// Run the command loop until `quit`, end of input, or an error
pub fn run<R: BufRead, W: Write>(
    engine: &QueryEngine<'_>,
    input: R,
    mut output: W,
) -> QueryResult<()> {
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line)? {
            Command::Get {
                user_id,
                ad_id,
                query_id,
                position,
                depth,
            } => {
                let (clicks, impressions) = engine.get(user_id, ad_id, query_id, position, depth)?;
                writeln!(output, "{clicks} {impressions}")?;
            }
            Command::Clicked { user_id } => {
                for (ad_id, query_id) in engine.clicked(user_id)? {
                    writeln!(output, "{ad_id} {query_id}")?;
                }
            }
            Command::Impressed { user_a, user_b } => {
                for (ad_id, creatives) in engine.impressed(user_a, user_b)? {
                    for (advertiser_id, keyword_id, title_id, description_id) in creatives {
                        writeln!(
                            output,
                            "{ad_id}: {advertiser_id} {keyword_id} {title_id} {description_id}"
                        )?;
                    }
                }
            }
            Command::Profit { ad_id, ctr_threshold } => {
                for user_id in engine.profit(ad_id, ctr_threshold)? {
                    writeln!(output, "{user_id}")?;
                }
            }
            Command::Quit => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBuilder;
    use crate::store::RecordStore;
    use std::io::Cursor;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_get() {
        assert_eq!(
            parse_command("get 100 5 77 1 2").unwrap(),
            Command::Get {
                user_id: 100,
                ad_id: 5,
                query_id: 77,
                position: 1,
                depth: 2,
            }
        );
    }

    #[test]
    fn test_parse_clicked_and_impressed() {
        assert_eq!(
            parse_command("clicked 42").unwrap(),
            Command::Clicked { user_id: 42 }
        );
        assert_eq!(
            parse_command("  impressed 1 2  ").unwrap(),
            Command::Impressed {
                user_a: 1,
                user_b: 2,
            }
        );
    }

    #[test]
    fn test_parse_profit_decimal() {
        match parse_command("profit 5 0.35").unwrap() {
            Command::Profit {
                ad_id,
                ctr_threshold,
            } => {
                assert_eq!(ad_id, 5);
                assert!((ctr_threshold - 0.35).abs() < f64::EPSILON);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        // integer thresholds parse too
        assert!(matches!(
            parse_command("profit 5 1").unwrap(),
            Command::Profit { .. }
        ));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(matches!(
            parse_command("ctr 5"),
            Err(QueryError::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_parse_bad_arguments() {
        assert!(matches!(
            parse_command("get 100 5"),
            Err(QueryError::Parse(_))
        ));
        assert!(matches!(
            parse_command("clicked abc"),
            Err(QueryError::Parse(_))
        ));
        assert!(matches!(
            parse_command("clicked 1 2"),
            Err(QueryError::Parse(_))
        ));
    }

    #[test]
    fn test_run_loop() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1\t10\t9\t5\t1\t2\t1\t77\t0\t0\t0\t100").unwrap();
        writeln!(file, "2\t20\t9\t5\t1\t2\t1\t77\t0\t0\t0\t100").unwrap();
        file.flush().unwrap();

        let store = RecordStore::open(file.path()).unwrap();
        let index = IndexBuilder::default().build(&store).unwrap();
        let engine = QueryEngine::new(&store, &index);

        let input = Cursor::new("get 100 5 77 1 2\nclicked 100\nquit\n");
        let mut output = Vec::new();
        run(&engine, input, &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "3 30\n5 77\n"
        );
    }

    #[test]
    fn test_run_stops_on_unknown_command() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1\t10\t9\t5\t1\t2\t1\t77\t0\t0\t0\t100").unwrap();
        file.flush().unwrap();

        let store = RecordStore::open(file.path()).unwrap();
        let index = IndexBuilder::default().build(&store).unwrap();
        let engine = QueryEngine::new(&store, &index);

        let input = Cursor::new("bogus 1\nclicked 100\n");
        let mut output = Vec::new();
        let result = run(&engine, input, &mut output);

        assert!(matches!(result, Err(QueryError::UnknownCommand(_))));
        assert!(output.is_empty());
    }
}
