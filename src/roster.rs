use csv::{Reader, WriterBuilder};
use std::path::Path;

use serde::{Serialize, Deserialize};

pub type ParticipantId = u64;

/// One member of the dining roster. Read-only to the matching engine;
/// created and edited through roster management.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub team: String,
    pub is_participating: bool,
    pub is_new_hire: bool,
    pub buddy_id: Option<ParticipantId>,
}

/// Team label for members imported without one.
pub const UNASSIGNED_TEAM: &str = "Unassigned";

/// Parses a boolean from the import formats in use ("Y", "O", "yes", "true", "1")
fn parse_bool(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "y" || lower == "o" || lower == "yes" || lower == "true" || lower == "1"
}

/// Next free identifier for the given roster.
pub fn next_id(roster: &[Participant]) -> ParticipantId {
    roster.iter().map(|p| p.id).max().unwrap_or(0) + 1
}

/// Loads a roster from a CSV file with columns `name,team,participating,new_hire,buddy`.
/// Column positions are located by header; buddy references are given by name
/// and resolved in a second pass so pairs can appear in any row order. Rows
/// with an empty or duplicate name are skipped.
pub fn load_roster<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Participant>, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_path(csv_path)?;

    let headers = reader.headers()?.clone();
    let column = |needle: &str, fallback: usize| {
        headers
            .iter()
            .position(|h| h.to_lowercase().contains(needle))
            .unwrap_or(fallback)
    };
    let name_col = headers
        .iter()
        .position(|h| {
            let lower = h.to_lowercase();
            lower.contains("name") && !lower.contains("buddy")
        })
        .unwrap_or(0);
    let team_col = column("team", 1);
    let participating_col = column("particip", 2);
    let new_hire_col = column("new", 3);
    let buddy_col = column("buddy", 4);

    let mut roster: Vec<Participant> = Vec::new();
    let mut buddy_names: Vec<(ParticipantId, String)> = Vec::new();

    for result in reader.records() {
        let record = result?;
        let name = record.get(name_col).unwrap_or("").trim().to_string();
        if name.is_empty() || roster.iter().any(|p| p.name == name) {
            continue;
        }

        let team = record.get(team_col).unwrap_or("").trim();
        let team = if team.is_empty() {
            UNASSIGNED_TEAM.to_string()
        } else {
            team.to_string()
        };
        // An empty participation cell means opted in.
        let participating_cell = record.get(participating_col).unwrap_or("").trim();
        let is_participating = participating_cell.is_empty() || parse_bool(participating_cell);
        let is_new_hire = parse_bool(record.get(new_hire_col).unwrap_or(""));

        let id = next_id(&roster);
        let buddy = record.get(buddy_col).unwrap_or("").trim();
        if !buddy.is_empty() {
            buddy_names.push((id, buddy.to_string()));
        }

        roster.push(Participant {
            id,
            name,
            team,
            is_participating,
            is_new_hire,
            buddy_id: None,
        });
    }

    resolve_buddies(&mut roster, &buddy_names);
    Ok(roster)
}

/// Imports pasted roster lines of the form
/// `name<TAB or ,>team<TAB>new hire (Y/N)<TAB>buddy name`.
/// Only the name is required. Buddy names are linked in a second pass so a
/// pair can be pasted in any order. Returns the number of members added and
/// per-line error notes for the rest.
pub fn import_bulk(roster: &mut Vec<Participant>, text: &str) -> (usize, Vec<String>) {
    let mut added = 0;
    let mut errors = Vec::new();
    let mut buddy_names: Vec<(ParticipantId, String)> = Vec::new();

    for line in text.lines() {
        let parts: Vec<&str> = line
            .split(|c| c == '\t' || c == ',')
            .map(str::trim)
            .collect();
        let name = match parts.first() {
            Some(name) if !name.is_empty() => *name,
            _ => continue,
        };
        if roster.iter().any(|p| p.name == name) {
            errors.push(format!("{} (duplicate)", name));
            continue;
        }

        let team = match parts.get(1) {
            Some(team) if !team.is_empty() => team.to_string(),
            _ => UNASSIGNED_TEAM.to_string(),
        };
        let is_new_hire = parts.get(2).map(|v| parse_bool(v)).unwrap_or(false);

        let id = next_id(roster);
        if let Some(buddy) = parts.get(3) {
            if !buddy.is_empty() {
                buddy_names.push((id, buddy.to_string()));
            }
        }

        roster.push(Participant {
            id,
            name: name.to_string(),
            team,
            is_participating: true,
            is_new_hire,
            buddy_id: None,
        });
        added += 1;
    }

    resolve_buddies(roster, &buddy_names);
    (added, errors)
}

fn resolve_buddies(roster: &mut [Participant], buddy_names: &[(ParticipantId, String)]) {
    for (holder, buddy_name) in buddy_names {
        let buddy_id = roster
            .iter()
            .find(|p| p.name == *buddy_name)
            .map(|p| p.id);
        let buddy_id = match buddy_id {
            Some(id) if id != *holder => id,
            _ => continue,
        };
        if let Some(entry) = roster.iter_mut().find(|p| p.id == *holder) {
            entry.buddy_id = Some(buddy_id);
        }
    }
}

/// Validates a new or edited roster entry. `id` is the entry being edited,
/// or `None` for a new one.
pub fn validate_participant(
    roster: &[Participant],
    id: Option<ParticipantId>,
    name: &str,
    buddy_id: Option<ParticipantId>,
) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name is required".to_string());
    }
    if roster.iter().any(|p| p.name == name && Some(p.id) != id) {
        return Err(format!("\"{}\" is already on the roster", name));
    }
    if let Some(buddy) = buddy_id {
        if Some(buddy) == id {
            return Err("A participant cannot be their own buddy".to_string());
        }
        if !roster.iter().any(|p| p.id == buddy) {
            return Err("Buddy must be an existing roster member".to_string());
        }
    }
    Ok(())
}

/// Writes the roster as CSV in the same column layout `load_roster` reads.
pub fn export_roster<W: std::io::Write>(
    roster: &[Participant],
    writer: W,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(["name", "team", "participating", "new_hire", "buddy"])?;
    for p in roster {
        let buddy_name = p
            .buddy_id
            .and_then(|buddy| roster.iter().find(|other| other.id == buddy))
            .map(|buddy| buddy.name.clone())
            .unwrap_or_default();
        wtr.write_record([
            p.name.as_str(),
            p.team.as_str(),
            if p.is_participating { "Y" } else { "N" },
            if p.is_new_hire { "Y" } else { "N" },
            buddy_name.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
