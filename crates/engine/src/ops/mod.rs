use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{Clock, ResultEngine, SplitTolerances, SystemClock};

mod balances;
mod expenses;
mod users;

pub use balances::UserBalance;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of the expense engine.
///
/// Holds the injected collaborators: the database (also used as the user
/// directory), the clock stamping new expenses and the split tolerances.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    clock: Arc<dyn Clock>,
    tolerances: SplitTolerances,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn tolerances(&self) -> &SplitTolerances {
        &self.tolerances
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    clock: Option<Arc<dyn Clock>>,
    tolerances: SplitTolerances,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the clock (defaults to [`SystemClock`]).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> EngineBuilder {
        self.clock = Some(clock);
        self
    }

    /// Override the split tolerances.
    pub fn tolerances(mut self, tolerances: SplitTolerances) -> EngineBuilder {
        self.tolerances = tolerances;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            tolerances: self.tolerances,
        })
    }
}
