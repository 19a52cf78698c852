use rusqlite::Connection;

use super::Migration;
use crate::error::Result;
use crate::storage::database::schema;

pub struct V2Fts;

impl Migration for V2Fts {
    fn version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "Full-text index over paper title, abstract and DOI"
    }

    fn up(&self, conn: &Connection) -> Result<()> {
        schema::create_fts_table(conn)
    }
}
