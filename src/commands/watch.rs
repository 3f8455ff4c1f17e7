use super::{format_ticket_line, open_backend};
use crate::config::Config;
use crate::error::Result;
use crate::feed::TicketFeed;
use crate::types::StatusFilter;

/// Follow the live feed for one status partition, reprinting the list on
/// every change until interrupted.
pub async fn cmd_watch(status: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let filter: StatusFilter = match status {
        Some(s) => s.parse()?,
        None => config.default_status,
    };

    let backend = open_backend(&config)?;
    let feed = TicketFeed::new(backend);
    let mut rx = feed.watch();
    feed.set_filter(filter);

    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow().clone();
        if snapshot.loading {
            continue;
        }
        if let Some(error) = &snapshot.error {
            eprintln!("feed error: {error}");
            continue;
        }
        println!(
            "-- {} {} ticket(s) --",
            snapshot.tickets.len(),
            snapshot.filter
        );
        for ticket in &snapshot.tickets {
            println!("{}", format_ticket_line(ticket));
        }
    }
    Ok(())
}
