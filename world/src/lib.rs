#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative authoring session for blockgrid levels.
//!
//! The session owns every level in the catalog together with its grid and its
//! undo/redo history. All mutation goes through [`apply`]; reads go through
//! [`query`].

use std::collections::BTreeMap;

use blockgrid_core::{
    CellCoord, Command, Event, GridDimensions, HistoryDirection, LevelError, LevelId,
    LevelResource, Occupant, Placement, PlacementMode, DEFAULT_LEVEL_NAME,
};
use blockgrid_grid::GridModel;
use blockgrid_system_history::{self as history, History};

#[derive(Debug)]
struct LevelEntry {
    name: String,
    grid: GridModel,
    history: History,
}

impl LevelEntry {
    fn new(name: String, grid: GridModel, config: history::Config) -> Self {
        Self {
            name,
            grid,
            history: History::new(config),
        }
    }
}

/// Represents the authoring state of every level known to the editor.
#[derive(Debug)]
pub struct Session {
    levels: BTreeMap<LevelId, LevelEntry>,
    active: Option<LevelId>,
    next_level: u32,
    history: history::Config,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(history::Config::default())
    }
}

impl Session {
    /// Creates an empty session whose levels keep history per `config`.
    #[must_use]
    pub fn new(config: history::Config) -> Self {
        Self {
            levels: BTreeMap::new(),
            active: None,
            next_level: 1,
            history: config,
        }
    }

    fn allocate_id(&mut self) -> LevelId {
        let id = LevelId::new(self.next_level);
        self.next_level = self.next_level.saturating_add(1);
        id
    }

    fn is_name_taken(&self, name: &str, except: Option<LevelId>) -> bool {
        self.levels
            .iter()
            .any(|(id, entry)| Some(*id) != except && entry.name == name)
    }

    fn unique_name(&self, base: &str) -> String {
        if !self.is_name_taken(base, None) {
            return base.to_owned();
        }
        (2u32..)
            .map(|suffix| format!("{base} {suffix}"))
            .find(|candidate| !self.is_name_taken(candidate, None))
            .unwrap_or_else(|| base.to_owned())
    }

    fn active_entry_mut(&mut self) -> Result<(LevelId, &mut LevelEntry), LevelError> {
        let level = self.active.ok_or(LevelError::NoActiveLevel)?;
        self.levels
            .get_mut(&level)
            .map(|entry| (level, entry))
            .ok_or(LevelError::UnknownLevel(level))
    }

    fn record_active(&mut self) {
        if let Ok((_, entry)) = self.active_entry_mut() {
            entry.history.record(&entry.grid);
        }
    }

    fn insert_level(
        &mut self,
        name: String,
        grid: GridModel,
        out_events: &mut Vec<Event>,
    ) -> LevelId {
        self.record_active();

        let level = self.allocate_id();
        let dimensions = grid.dimensions();
        log::info!("created {level} '{name}' ({dimensions})");
        let _ = self
            .levels
            .insert(level, LevelEntry::new(name.clone(), grid, self.history));
        self.active = Some(level);

        out_events.push(Event::LevelCreated {
            level,
            name,
            dimensions,
        });
        out_events.push(Event::LevelSelected { level, dimensions });
        level
    }
}

/// Applies the provided command to the session, mutating state deterministically.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    let outcome = match command {
        Command::CreateLevel { name, dimensions } => {
            create_level(session, name, dimensions, out_events)
        }
        Command::ImportLevel { resource } => import_level(session, &resource, out_events),
        Command::SelectLevel { level } => select_level(session, level, out_events),
        Command::RenameLevel { level, name } => rename_level(session, level, &name, out_events),
        Command::DeleteLevel { level } => delete_level(session, level, out_events),
        Command::PlaceBlock {
            coord,
            occupant,
            mode,
        } => place_block(session, coord, occupant, mode, out_events),
        Command::RemoveBlock { coord } => remove_block(session, coord, out_events),
        Command::Undo => step_history(session, HistoryDirection::Undo, out_events),
        Command::Redo => step_history(session, HistoryDirection::Redo, out_events),
    };

    if let Err(reason) = outcome {
        log::warn!("rejected command: {reason}");
        out_events.push(Event::CommandRejected { reason });
    }
}

fn create_level(
    session: &mut Session,
    name: Option<String>,
    dimensions: GridDimensions,
    out_events: &mut Vec<Event>,
) -> Result<(), LevelError> {
    let name = match name {
        Some(requested) => {
            let trimmed = requested.trim();
            if trimmed.is_empty() {
                return Err(LevelError::EmptyName);
            }
            if session.is_name_taken(trimmed, None) {
                return Err(LevelError::NameTaken(trimmed.to_owned()));
            }
            trimmed.to_owned()
        }
        None => session.unique_name(DEFAULT_LEVEL_NAME),
    };

    let _ = session.insert_level(name, GridModel::new(dimensions), out_events);
    Ok(())
}

fn import_level(
    session: &mut Session,
    resource: &LevelResource,
    out_events: &mut Vec<Event>,
) -> Result<(), LevelError> {
    let grid = GridModel::from_resource(resource)?;
    let trimmed = resource.name.trim();
    let base = if trimmed.is_empty() {
        DEFAULT_LEVEL_NAME
    } else {
        trimmed
    };
    let name = session.unique_name(base);
    if name != resource.name {
        log::debug!("imported level '{}' renamed to '{name}'", resource.name);
    }

    let _ = session.insert_level(name, grid, out_events);
    Ok(())
}

fn select_level(
    session: &mut Session,
    level: LevelId,
    out_events: &mut Vec<Event>,
) -> Result<(), LevelError> {
    let entry = session
        .levels
        .get(&level)
        .ok_or(LevelError::UnknownLevel(level))?;
    let dimensions = entry.grid.dimensions();
    session.active = Some(level);
    log::info!("selected {level} '{}'", entry.name);
    out_events.push(Event::LevelSelected { level, dimensions });
    Ok(())
}

fn rename_level(
    session: &mut Session,
    level: LevelId,
    name: &str,
    out_events: &mut Vec<Event>,
) -> Result<(), LevelError> {
    if !session.levels.contains_key(&level) {
        return Err(LevelError::UnknownLevel(level));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(LevelError::EmptyName);
    }
    if session.is_name_taken(name, Some(level)) {
        return Err(LevelError::NameTaken(name.to_owned()));
    }

    let entry = session
        .levels
        .get_mut(&level)
        .ok_or(LevelError::UnknownLevel(level))?;
    if entry.name == name {
        return Ok(());
    }

    entry.history.record(&entry.grid);
    log::info!("renamed {level} '{}' to '{name}'", entry.name);
    entry.name = name.to_owned();
    out_events.push(Event::LevelRenamed {
        level,
        name: entry.name.clone(),
    });
    Ok(())
}

fn delete_level(
    session: &mut Session,
    level: LevelId,
    out_events: &mut Vec<Event>,
) -> Result<(), LevelError> {
    let entry = session
        .levels
        .remove(&level)
        .ok_or(LevelError::UnknownLevel(level))?;
    if session.active == Some(level) {
        session.active = None;
    }
    log::info!("deleted {level} '{}'", entry.name);
    out_events.push(Event::LevelDeleted { level });
    Ok(())
}

fn place_block(
    session: &mut Session,
    coord: CellCoord,
    occupant: Occupant,
    mode: PlacementMode,
    out_events: &mut Vec<Event>,
) -> Result<(), LevelError> {
    let (level, entry) = session.active_entry_mut()?;

    let placement = match entry.grid.check_placement(coord, occupant, mode) {
        Ok(Placement::Unchanged) => return Ok(()),
        Ok(placement) => placement,
        Err(reason) => {
            log::debug!("placement at {coord} rejected: {reason}");
            out_events.push(Event::PlacementRejected { coord, reason });
            return Ok(());
        }
    };

    entry.history.record(&entry.grid);
    let applied = entry.grid.try_place(coord, occupant, mode);
    debug_assert_eq!(applied, Ok(placement));

    let replaced = match placement {
        Placement::Replaced { previous } => Some(previous),
        Placement::Inserted | Placement::Unchanged => None,
    };
    log::debug!("placed {} block at {coord} in {level}", occupant.kind);
    out_events.push(Event::BlockPlaced {
        level,
        coord,
        occupant,
        replaced,
    });
    Ok(())
}

fn remove_block(
    session: &mut Session,
    coord: CellCoord,
    out_events: &mut Vec<Event>,
) -> Result<(), LevelError> {
    let (level, entry) = session.active_entry_mut()?;
    if !entry.grid.is_occupied(coord) {
        return Ok(());
    }

    entry.history.record(&entry.grid);
    if let Some(occupant) = entry.grid.remove(coord) {
        log::debug!("removed block at {coord} in {level}");
        out_events.push(Event::BlockRemoved {
            level,
            coord,
            occupant,
        });
    }
    Ok(())
}

fn step_history(
    session: &mut Session,
    direction: HistoryDirection,
    out_events: &mut Vec<Event>,
) -> Result<(), LevelError> {
    let (level, entry) = session.active_entry_mut()?;
    let restored = match direction {
        HistoryDirection::Undo => entry.history.undo(&mut entry.grid),
        HistoryDirection::Redo => entry.history.redo(&mut entry.grid),
    };
    if restored {
        log::debug!("{direction:?} restored {level}");
        out_events.push(Event::HistoryRestored {
            level,
            direction,
            dimensions: entry.grid.dimensions(),
        });
    }
    Ok(())
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use blockgrid_core::{GridDimensions, LevelId, LevelResource};
    use blockgrid_grid::GridModel;

    use super::{LevelEntry, Session};

    /// Read-only summary of a catalogued level.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LevelSummary<'a> {
        level: LevelId,
        name: &'a str,
        dimensions: GridDimensions,
        blocks: usize,
    }

    impl<'a> LevelSummary<'a> {
        fn new(level: LevelId, entry: &'a LevelEntry) -> Self {
            Self {
                level,
                name: &entry.name,
                dimensions: entry.grid.dimensions(),
                blocks: entry.grid.len(),
            }
        }

        /// Identifier of the level.
        #[must_use]
        pub const fn level(&self) -> LevelId {
            self.level
        }

        /// Display name of the level.
        #[must_use]
        pub const fn name(&self) -> &'a str {
            self.name
        }

        /// Dimensions of the level grid.
        #[must_use]
        pub const fn dimensions(&self) -> GridDimensions {
            self.dimensions
        }

        /// Number of blocks placed in the level.
        #[must_use]
        pub const fn blocks(&self) -> usize {
            self.blocks
        }
    }

    fn summaries(session: &Session) -> Vec<LevelSummary<'_>> {
        session
            .levels
            .iter()
            .map(|(level, entry)| LevelSummary::new(*level, entry))
            .collect()
    }

    /// Lists every level sorted by name.
    #[must_use]
    pub fn levels(session: &Session) -> Vec<LevelSummary<'_>> {
        let mut levels = summaries(session);
        levels.sort_by(|a, b| a.name.cmp(b.name).then(a.level.cmp(&b.level)));
        levels
    }

    /// Lists every level in play order.
    ///
    /// Levels sort by the first decimal number in their name; names without a
    /// number come last. Ties fall back to the name.
    #[must_use]
    pub fn levels_in_play_order(session: &Session) -> Vec<LevelSummary<'_>> {
        let mut levels = summaries(session);
        levels.sort_by(|a, b| {
            let key_a = (first_number(a.name).is_none(), first_number(a.name));
            let key_b = (first_number(b.name).is_none(), first_number(b.name));
            key_a
                .cmp(&key_b)
                .then(a.name.cmp(b.name))
                .then(a.level.cmp(&b.level))
        });
        levels
    }

    /// Extracts the first run of decimal digits in `name`.
    ///
    /// Runs too long for `u64` saturate instead of being ignored.
    #[must_use]
    pub fn first_number(name: &str) -> Option<u64> {
        let start = name.find(|c: char| c.is_ascii_digit())?;
        let digits = &name[start..];
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        Some(digits[..end].parse().unwrap_or(u64::MAX))
    }

    /// Level currently open for editing, if any.
    #[must_use]
    pub fn active_level(session: &Session) -> Option<LevelId> {
        session.active
    }

    /// Summary of a single level.
    #[must_use]
    pub fn level(session: &Session, level: LevelId) -> Option<LevelSummary<'_>> {
        session
            .levels
            .get(&level)
            .map(|entry| LevelSummary::new(level, entry))
    }

    /// Finds a level by its exact name.
    #[must_use]
    pub fn level_by_name(session: &Session, name: &str) -> Option<LevelId> {
        session
            .levels
            .iter()
            .find(|(_, entry)| entry.name == name)
            .map(|(level, _)| *level)
    }

    /// Grid of the provided level.
    #[must_use]
    pub fn grid(session: &Session, level: LevelId) -> Option<&GridModel> {
        session.levels.get(&level).map(|entry| &entry.grid)
    }

    /// Grid of the active level.
    #[must_use]
    pub fn active_grid(session: &Session) -> Option<&GridModel> {
        session.active.and_then(|level| grid(session, level))
    }

    /// Reports whether undoing would change the active level.
    #[must_use]
    pub fn can_undo(session: &Session) -> bool {
        active_entry(session).is_some_and(|entry| entry.history.can_undo())
    }

    /// Reports whether redoing would change the active level.
    #[must_use]
    pub fn can_redo(session: &Session) -> bool {
        active_entry(session).is_some_and(|entry| entry.history.can_redo())
    }

    /// Exports a level in its persisted form.
    #[must_use]
    pub fn export_level(session: &Session, level: LevelId) -> Option<LevelResource> {
        session
            .levels
            .get(&level)
            .map(|entry| entry.grid.to_resource(&entry.name))
    }

    fn active_entry(session: &Session) -> Option<&LevelEntry> {
        session
            .active
            .and_then(|level| session.levels.get(&level))
    }
}
