//! Splitting of scenario command lines into argument lists
//!
//! Scenario steps spell commands the way a person types them into a shell,
//! e.g. `probe -o outfile.tmp 'some quoted value'`. The grouping rule is
//! deliberately small: tokens are whitespace separated, a token opening with
//! `'` starts a quoted argument and a later token closing with `'` ends it.
//! There are no escapes and no nesting. An opening quote that is never closed
//! swallows the rest of the line into one argument.

use tracing::warn;

/// Split `line` into program arguments.
///
/// Quoted runs are rejoined with single spaces and lose their surrounding
/// quote characters. The quote on the opening token is always stripped; the
/// closing quote is only recognised on a later token, so `'abc'` on its own
/// opens a quoted argument that is never closed.
pub fn parse(line: &str) -> Vec<String> {
    let (args, unterminated) = split(line);
    if unterminated {
        warn!(
            "Unterminated quote in command line {:?}; remaining tokens were grouped into {:?}",
            line,
            args.last()
        );
    }
    args
}

/// Whether `line` opens a quoted argument that is never closed.
pub fn has_unterminated_quote(line: &str) -> bool {
    split(line).1
}

fn split(line: &str) -> (Vec<String>, bool) {
    let mut args: Vec<String> = Vec::new();
    let mut outside = true;

    for token in line.split_whitespace() {
        if outside {
            match token.strip_prefix('\'') {
                Some(rest) => {
                    args.push(rest.to_string());
                    outside = false;
                }
                None => args.push(token.to_string()),
            }
            continue;
        }

        let (piece, closes) = match token.strip_suffix('\'') {
            Some(piece) => (piece, true),
            None => (token, false),
        };
        if let Some(last) = args.last_mut() {
            last.push(' ');
            last.push_str(piece);
        }
        if closes {
            outside = true;
        }
    }

    (args, !outside)
}
