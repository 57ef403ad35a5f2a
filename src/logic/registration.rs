//! Registration phase: open/close registration and bulk team import.

use crate::models::{TeamId, Tournament, TournamentError, TournamentStatus};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Open registration (Draft -> RegistrationOpen).
pub fn open_registration(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::Draft {
        return Err(TournamentError::InvalidState {
            status: tournament.status,
        });
    }
    tournament.status = TournamentStatus::RegistrationOpen;
    tournament.touch();
    Ok(())
}

/// Freeze the team list (RegistrationOpen -> RegistrationClosed).
pub fn close_registration(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::RegistrationOpen {
        return Err(TournamentError::InvalidState {
            status: tournament.status,
        });
    }
    tournament.status = TournamentStatus::RegistrationClosed;
    tournament.touch();
    log::info!(
        "Registration closed for tournament {} with {} approved teams",
        tournament.id,
        tournament.approved_team_ids().len()
    );
    Ok(())
}

#[derive(Debug, Deserialize)]
struct TeamRow {
    name: String,
    clan_tag: String,
}

/// A CSV row that could not be registered.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RejectedRow {
    /// 1-based line number in the input, header included.
    pub line: u64,
    pub reason: String,
}

/// Outcome of a bulk import.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ImportReport {
    pub registered: Vec<TeamId>,
    pub rejected: Vec<RejectedRow>,
}

/// Register teams from CSV with a `name,clan_tag` header (RegistrationOpen only).
/// Bad rows are reported and skipped; the remaining rows are still registered.
pub fn import_teams_csv<R: Read>(
    tournament: &mut Tournament,
    input: R,
) -> Result<ImportReport, TournamentError> {
    if tournament.status != TournamentStatus::RegistrationOpen {
        return Err(TournamentError::InvalidState {
            status: tournament.status,
        });
    }
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let mut report = ImportReport::default();
    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            report.rejected.push(RejectedRow {
                line: 1,
                reason: e.to_string(),
            });
            return Ok(report);
        }
    };
    for result in reader.records() {
        let row = result.and_then(|record| {
            let line = record.position().map_or(0, |p| p.line());
            record.deserialize::<TeamRow>(Some(&headers)).map(|row| (line, row))
        });
        match row {
            Ok((line, row)) => match tournament.register_team(row.name, &row.clan_tag) {
                Ok(id) => report.registered.push(id),
                Err(e) => report.rejected.push(RejectedRow {
                    line,
                    reason: e.to_string(),
                }),
            },
            Err(e) => report.rejected.push(RejectedRow {
                line: e.position().map_or(0, |p| p.line()),
                reason: e.to_string(),
            }),
        }
    }
    log::info!(
        "Imported {} teams into tournament {} ({} rows rejected)",
        report.registered.len(),
        tournament.id,
        report.rejected.len()
    );
    Ok(report)
}
