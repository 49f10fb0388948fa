//! Interactive register session.
//!
//! Reads one command per line from stdin. Unlike the one-shot commands, the
//! session stays open, so a removed line can be restored with `undo`, and
//! the cart can still be worked on while a payment settles.

use std::io::Write;

use thiserror::Error;
use till_register::checkout::{OrderSnapshot, PaymentProcessor, SimulatedProcessor};
use till_register::notice::Notice;
use till_register::session::SalesSession;
use till_register::storage::KeyValueStore;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::debug;

use super::{cart, catalog, checkout, filter};
use crate::output;

const HELP: &str = "\
Commands:
  catalog                 list products matching the saved filters
  cart                    show the cart
  add ID                  add one unit of a product
  scan CODE               add the product with this barcode
  remove ID               remove a product's line
  undo                    restore the last removed line
  qty ID DELTA            change a quantity (never below 1)
  clear                   empty the cart
  search [TEXT]           set or clear the search text
  category [NAME]         select or clear the category
  checkout [NOTES]        pay and print a receipt
  help                    show this help
  quit                    leave the register";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Catalog,
    Cart,
    Add(String),
    Scan(String),
    Remove(String),
    Undo,
    Quantity(String, i64),
    Clear,
    Search(String),
    Category(Option<String>),
    Checkout(Option<String>),
    Quit,
}

/// Errors from parsing a shell line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("Unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid quantity change: {0}")]
    InvalidDelta(String),
}

impl ShellCommand {
    /// Parse one input line. Blank lines yield `None`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown commands or missing arguments.
    pub fn parse(line: &str) -> Result<Option<Self>, ShellError> {
        let line = line.trim();
        let Some((word, rest)) = split_word(line) else {
            return Ok(None);
        };
        let rest_opt = || Some(rest.to_string()).filter(|r| !r.is_empty());

        let command = match word.to_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "catalog" | "ls" => Self::Catalog,
            "cart" => Self::Cart,
            "add" => Self::Add(rest_opt().ok_or(ShellError::Usage("add ID"))?),
            "scan" => Self::Scan(rest_opt().ok_or(ShellError::Usage("scan CODE"))?),
            "remove" | "rm" => Self::Remove(rest_opt().ok_or(ShellError::Usage("remove ID"))?),
            "undo" => Self::Undo,
            "qty" => {
                let (id, delta) = split_word(rest).ok_or(ShellError::Usage("qty ID DELTA"))?;
                if delta.is_empty() {
                    return Err(ShellError::Usage("qty ID DELTA"));
                }
                let delta = delta
                    .parse::<i64>()
                    .map_err(|_| ShellError::InvalidDelta(delta.to_string()))?;
                Self::Quantity(id.to_string(), delta)
            }
            "clear" => Self::Clear,
            "search" => Self::Search(rest.to_string()),
            "category" => Self::Category(rest_opt()),
            "checkout" | "pay" => Self::Checkout(rest_opt()),
            "quit" | "exit" => Self::Quit,
            other => return Err(ShellError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Split off the first whitespace-delimited word.
fn split_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    Some(match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    })
}

/// Run the interactive loop on stdin until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if stdin or stdout fails.
pub async fn run<S: KeyValueStore>(session: &mut SalesSession<S>) -> std::io::Result<()> {
    serve(session, BufReader::new(tokio::io::stdin())).await
}

/// Serve commands read from `input`.
///
/// While a payment settles, input keeps being read and applied; the receipt
/// is printed as soon as settlement finishes.
#[allow(clippy::print_stdout)]
async fn serve<S, R>(session: &mut SalesSession<S>, input: R) -> std::io::Result<()>
where
    S: KeyValueStore,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    println!("{} register. Type `help` for commands.", session.config().store_name);

    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let Some(command) = parse_or_report(&line) else {
            continue;
        };

        match command {
            ShellCommand::Quit => break,
            ShellCommand::Checkout(notes) => {
                if let Ok(snapshot) = checkout::start(session, notes) {
                    settle_while_serving(session, &mut lines, snapshot).await?;
                }
            }
            other => apply(session, other),
        }
    }
    Ok(())
}

/// Wait for settlement while still applying commands from `lines`.
async fn settle_while_serving<S, R>(
    session: &mut SalesSession<S>,
    lines: &mut Lines<R>,
    snapshot: OrderSnapshot,
) -> std::io::Result<()>
where
    S: KeyValueStore,
    R: AsyncBufRead + Unpin,
{
    let processor = SimulatedProcessor::new(session.config().processing_delay);
    let settle = processor.settle(&snapshot);
    tokio::pin!(settle);
    let mut input_open = true;

    loop {
        prompt()?;
        tokio::select! {
            outcome = &mut settle => {
                if let Err(e) = checkout::finish(session, outcome) {
                    debug!(error = %e, "Checkout did not complete");
                }
                return Ok(());
            }
            line = lines.next_line(), if input_open => {
                match line? {
                    Some(line) => {
                        if let Some(command) = parse_or_report(&line) {
                            apply(session, command);
                        }
                    }
                    None => input_open = false,
                }
            }
        }
    }
}

/// Apply a command that does not start or end the session's checkout.
#[allow(clippy::print_stdout)]
fn apply<S: KeyValueStore>(session: &mut SalesSession<S>, command: ShellCommand) {
    match command {
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Catalog => catalog::list(session, None, None),
        ShellCommand::Cart => cart::show(session),
        ShellCommand::Add(id) => cart::add(session, &id),
        ShellCommand::Scan(code) => cart::scan(session, &code),
        ShellCommand::Remove(id) => cart::remove(session, &id),
        ShellCommand::Undo => cart::undo(session),
        ShellCommand::Quantity(id, delta) => cart::quantity(session, &id, delta),
        ShellCommand::Clear => cart::clear(session),
        ShellCommand::Search(text) => filter::search(session, text),
        ShellCommand::Category(name) => filter::category(session, name),
        ShellCommand::Checkout(_) | ShellCommand::Quit => {
            let message = session.checkout_flow().pending().map_or_else(
                || "Checkout is not available right now.".to_string(),
                |order| {
                    format!(
                        "Payment for {} line(s) is processing; please wait.",
                        order.lines.len()
                    )
                },
            );
            output::notice(&Notice::info(message));
        }
    }
}

fn parse_or_report(line: &str) -> Option<ShellCommand> {
    match ShellCommand::parse(line) {
        Ok(command) => command,
        Err(e) => {
            output::notice(&Notice::error(e.to_string()));
            None
        }
    }
}

#[allow(clippy::print_stdout)]
fn prompt() -> std::io::Result<()> {
    print!("till> ");
    std::io::stdout().flush()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(ShellCommand::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ShellCommand::parse("add 3").unwrap(),
            Some(ShellCommand::Add("3".to_string()))
        );
        assert_eq!(
            ShellCommand::parse("  QTY 2 -4 ").unwrap(),
            Some(ShellCommand::Quantity("2".to_string(), -4))
        );
        assert_eq!(
            ShellCommand::parse("checkout paid by card").unwrap(),
            Some(ShellCommand::Checkout(Some("paid by card".to_string())))
        );
        assert_eq!(
            ShellCommand::parse("category").unwrap(),
            Some(ShellCommand::Category(None))
        );
        assert_eq!(
            ShellCommand::parse("search").unwrap(),
            Some(ShellCommand::Search(String::new()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ShellCommand::parse("add"),
            Err(ShellError::Usage("add ID"))
        );
        assert_eq!(
            ShellCommand::parse("qty 2"),
            Err(ShellError::Usage("qty ID DELTA"))
        );
        assert_eq!(
            ShellCommand::parse("qty 2 lots"),
            Err(ShellError::InvalidDelta("lots".to_string()))
        );
        assert_eq!(
            ShellCommand::parse("refund 1"),
            Err(ShellError::UnknownCommand("refund".to_string()))
        );
    }

    mod serving {
        use std::time::Duration;

        use till_core::{CheckoutStatus, ItemId};
        use till_register::catalog::Catalog;
        use till_register::config::RegisterConfig;
        use till_register::storage::MemoryStore;

        use super::super::*;

        fn session() -> SalesSession<MemoryStore> {
            let config = RegisterConfig {
                processing_delay: Duration::from_millis(1800),
                ..RegisterConfig::default()
            };
            SalesSession::open(config, Catalog::builtin(), MemoryStore::new())
        }

        #[tokio::test(start_paused = true)]
        async fn test_input_is_served_while_payment_settles() {
            let mut session = session();
            let input: &[u8] = b"add 1\ncheckout\nsearch tea\nadd 2\n";

            serve(&mut session, input).await.unwrap();

            // `add 2` ran before settlement, so completing the sale cleared it.
            assert_eq!(session.checkout_status(), CheckoutStatus::Completed);
            assert!(session.cart().is_empty());
            assert_eq!(session.search(), "tea");
        }

        #[tokio::test(start_paused = true)]
        async fn test_commands_after_quit_are_ignored() {
            let mut session = session();
            let input: &[u8] = b"add 1\nquit\nadd 2\n";

            serve(&mut session, input).await.unwrap();

            assert!(session.cart().contains(&ItemId::new("1")));
            assert!(!session.cart().contains(&ItemId::new("2")));
        }
    }
}
