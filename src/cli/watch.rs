use super::{board, ui};
use crate::core::{Dashboard, Registry, Selection};
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Refresh,
    Quit,
    Select(String),
}

/// Interprets one line typed by the user. A tile number maps to the instrument
/// at that position; anything else is taken as an instrument name.
pub fn parse_input(line: &str, registry: &Registry) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Refresh;
    }
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Input::Quit;
    }
    if let Ok(number) = line.parse::<usize>()
        && let Some(instrument) = number.checked_sub(1).and_then(|i| registry.get(i))
    {
        return Input::Select(instrument.name.to_string());
    }
    Input::Select(line.to_string())
}

pub async fn run(dashboard: &Dashboard, selection: &mut Selection) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    run_with(dashboard, selection, stdin, &mut std::io::stdout()).await
}

/// Renders the board, then applies one line of `input` at a time until it is
/// exhausted or the user quits.
pub async fn run_with<R, W>(
    dashboard: &Dashboard,
    selection: &mut Selection,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let registry = dashboard.registry();
    let mut lines = input.lines();
    let mut render = true;

    loop {
        if render {
            writeln!(out, "{}", board::render(dashboard, selection).await)?;
        }
        write!(
            out,
            "\n{} ",
            ui::style_text(
                "Select by name or number, Enter to refresh, q to quit:",
                ui::StyleType::Subtle
            )
        )?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        render = match parse_input(&line, &registry) {
            Input::Quit => break,
            Input::Refresh => true,
            Input::Select(name) => match selection.select(&name) {
                Ok(instrument) => {
                    debug!(selected = instrument.name, "Instrument selected");
                    true
                }
                Err(e) => {
                    writeln!(out, "{}", ui::style_text(&e.to_string(), ui::StyleType::Error))?;
                    false
                }
            },
        };
        if render {
            writeln!(out, "{}", ui::separator())?;
        }
    }
    writeln!(out)?;
    Ok(())
}
