//! `watch` command: free text read from stdin is debounced before it
//! reaches the engine. Every line gets an immediate count preview; the full
//! result is printed only once typing pauses.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use stonemart_search::{FilterEngine, SearchSession};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::search::{listing_table, session_for};

/// # Errors
///
/// Returns an error if stdin cannot be read or stdout cannot be written.
pub(crate) async fn run_watch(
    engine: Arc<FilterEngine>,
    query: &str,
    delay: Duration,
    limit: usize,
) -> anyhow::Result<()> {
    let mut session = session_for(engine, query, None);
    let stdin = BufReader::new(tokio::io::stdin());
    watch_lines(&mut session, stdin, delay, limit, &mut std::io::stdout()).await?;
    tracing::debug!(recomputations = session.recomputations(), "watch finished");
    Ok(())
}

async fn watch_lines<R, W>(
    session: &mut SearchSession,
    input: R,
    delay: Duration,
    limit: usize,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    print_settled(session, limit, out)?;

    let mut settled = session.debounce_text(delay);
    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(text) => {
                    writeln!(out, "> {text:?}: {} matching", session.preview_count(&text))?;
                    session.type_text(&text);
                }
                None => break,
            },
            Some(text) = settled.recv() => {
                if session.apply_settled(&text) {
                    print_settled(session, limit, out)?;
                }
            }
        }
    }

    session.finish_text().await;
    while let Some(text) = settled.recv().await {
        if session.apply_settled(&text) {
            print_settled(session, limit, out)?;
        }
    }
    Ok(())
}

fn print_settled<W: Write>(session: &mut SearchSession, limit: usize, out: &mut W) -> anyhow::Result<()> {
    let outcome = session.outcome();
    writeln!(out, "== {} listings for `{}`", outcome.total(), session.query_string())?;
    if outcome.total() > 0 {
        write!(out, "{}", listing_table(outcome.listings(session.engine()).take(limit)))?;
    }
    Ok(())
}
