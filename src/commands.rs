//! Board subcommands.

use std::io::Write;

use anyhow::{Context, Result};
use loanboard_board::BoardManager;
use loanboard_client::TaskApi;
use loanboard_protocol::{Card, CardId, ColumnKey, Columns, DragEnd, DropTarget};
use tracing::debug;

use crate::cli::Commands;

/// Opens the board of `loan` and runs a board subcommand against it.
pub async fn execute<A: TaskApi>(
    api: A,
    loan: u64,
    columns: Columns,
    command: &Commands,
    out: &mut impl Write,
) -> Result<()> {
    let board = BoardManager::open(api, loan, columns).await?;
    debug!(loan, cards = board.cards().len(), "board ready");

    match command {
        Commands::Show => show(&board, out),
        Commands::Move {
            card,
            column,
            before,
        } => move_card(&board, CardId::new(*card), column, before.map(CardId::new), out).await,
        Commands::Add {
            column,
            title,
            description,
        } => {
            let card = board
                .add_card(&ColumnKey::new(column.as_str()), title, description)
                .await?;
            writeln!(out, "added {} to {} at position {}", label(&card), card.column, card.position)?;
            Ok(())
        }
        Commands::Remove { card } => {
            let card = board.remove_card(CardId::new(*card)).await?;
            writeln!(out, "removed {} from {}", label(&card), card.column)?;
            Ok(())
        }
        Commands::Config => anyhow::bail!("`config` does not operate on a board"),
    }
}

fn label(card: &Card) -> String {
    format!("#{} \"{}\"", card.id, card.title)
}

fn show<A: TaskApi>(board: &BoardManager<A>, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Loan {}", board.loan())?;
    for column in board.columns() {
        let cards = board.cards_by_column(&column.key);
        writeln!(out)?;
        writeln!(out, "{} ({})", column.title, cards.len())?;
        for card in &cards {
            let notes = if card.has_description() { " [notes]" } else { "" };
            writeln!(out, "  {}{notes}", label(card))?;
        }
    }
    Ok(())
}

async fn move_card<A: TaskApi>(
    board: &BoardManager<A>,
    card: CardId,
    column: &str,
    before: Option<CardId>,
    out: &mut impl Write,
) -> Result<()> {
    let column = ColumnKey::new(column);
    board
        .columns()
        .require(&column)
        .with_context(|| format!("cannot move card {card}"))?;
    if !board.begin_drag(card) {
        anyhow::bail!("card {card} is not on the board of loan {}", board.loan());
    }

    let target = match before {
        Some(before) => DropTarget::before(column.clone(), before),
        None => DropTarget::end_of(column.clone()),
    };
    let report = board.drop_card(&DragEnd::new(card, target)).await?;

    if report.is_empty() {
        writeln!(out, "card {card} is already there")?;
        return Ok(());
    }
    writeln!(out, "moved card {card} to {column}")?;
    for update in &report.updated {
        writeln!(out, "  #{} -> {} @ {}", update.id, update.status, update.position)?;
    }
    Ok(())
}
