use tokio::sync::watch;

/// Tables a live query can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Movie,
    Actor,
    MovieActor,
}

impl Table {
    pub const ALL: &'static [Table] = &[Table::Movie, Table::Actor, Table::MovieActor];
}

/// Per-table write counters. A counter only ever grows, so comparing two
/// snapshots tells whether a table was written in between, no matter how many
/// notifications were coalesced on the way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableVersions {
    movie: u64,
    actor: u64,
    movie_actor: u64,
}

impl TableVersions {
    pub fn get(&self, table: Table) -> u64 {
        match table {
            Table::Movie => self.movie,
            Table::Actor => self.actor,
            Table::MovieActor => self.movie_actor,
        }
    }

    fn bump(&mut self, table: Table) {
        let slot = match table {
            Table::Movie => &mut self.movie,
            Table::Actor => &mut self.actor,
            Table::MovieActor => &mut self.movie_actor,
        };
        *slot = slot.wrapping_add(1);
    }

    /// True when any of `tables` moved between `self` and `newer`.
    pub fn differs_in(&self, newer: &TableVersions, tables: &[Table]) -> bool {
        tables.iter().any(|table| self.get(*table) != newer.get(*table))
    }
}

/// Broadcasts table invalidations to live queries after each committed write.
#[derive(Debug)]
pub struct InvalidationTracker {
    versions: watch::Sender<TableVersions>,
}

impl InvalidationTracker {
    pub fn new() -> Self {
        let (versions, _) = watch::channel(TableVersions::default());
        Self { versions }
    }

    pub fn invalidate(&self, tables: &[Table]) {
        if tables.is_empty() {
            return;
        }
        self.versions.send_modify(|versions| {
            for table in tables {
                versions.bump(*table);
            }
        });
        log::trace!("invalidated tables {tables:?}");
    }

    pub fn subscribe(&self) -> watch::Receiver<TableVersions> {
        self.versions.subscribe()
    }

    pub fn current(&self) -> TableVersions {
        *self.versions.borrow()
    }
}

impl Default for InvalidationTracker {
    fn default() -> Self {
        Self::new()
    }
}
