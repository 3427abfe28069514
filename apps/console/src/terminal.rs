//! Terminal rendering: notifications on stderr and the transaction table.

use std::{
    io::{self, Write},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, PoisonError,
    },
};

use client_core::{Notification, NotificationIcon, NotificationTicket, Notifier, TagSnapshot};
use shared::protocol::{format_amount_cents, TransactionRow};
use tracing::{debug, trace};

/// Prints each notification as one block; dismissals only matter for toasts
/// that are redrawn, so they are traced and otherwise ignored here.
pub struct TerminalNotifier<W> {
    out: Mutex<W>,
    next_ticket: AtomicU64,
}

impl TerminalNotifier<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> TerminalNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            next_ticket: AtomicU64::new(1),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

fn glyph(icon: NotificationIcon) -> &'static str {
    match icon {
        NotificationIcon::Loading => "…",
        NotificationIcon::Success => "✔",
        NotificationIcon::Failure => "✖",
    }
}

impl<W: Write + Send> Notifier for TerminalNotifier<W> {
    fn open(&self, notification: Notification) -> NotificationTicket {
        let ticket = NotificationTicket(self.next_ticket.fetch_add(1, Ordering::Relaxed));
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let text = notification.message.plain_text();
        let mut lines = text.lines();
        let written = (|| -> io::Result<()> {
            writeln!(out, "{} {}", glyph(notification.icon), lines.next().unwrap_or_default())?;
            for line in lines {
                writeln!(out, "  {line}")?;
            }
            out.flush()
        })();
        if let Err(err) = written {
            debug!(error = %err, "failed to write notification");
        }
        ticket
    }

    fn dismiss(&self, ticket: NotificationTicket) {
        trace!(ticket = ticket.0, "notification dismissed");
    }

    fn dismiss_all(&self) {
        trace!("all notifications dismissed");
    }
}

/// One line per row: fish marker, amount, pending flag, description, inserted and updated times.
pub fn render_rows(rows: &[TransactionRow], tags: Option<&TagSnapshot>) -> Vec<String> {
    rows.iter()
        .map(|row| {
            let marker = match tags.and_then(|tags| tags.badge_for(&row.id)) {
                Some(badge) if badge.animate_enter => "🐟*",
                Some(_) => "🐟 ",
                None => "   ",
            };
            format!(
                "{marker} {:<12} {:>12} {:<7} {} {} {}",
                row.id,
                format_amount_cents(row.amount_in_cents),
                if row.is_pending { "pending" } else { "" },
                row.description,
                row.inserted_at.as_deref().unwrap_or("-"),
                row.updated_at.as_deref().unwrap_or("-"),
            )
        })
        .collect()
}
