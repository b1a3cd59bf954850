//! Catalog queries, one per metadata class.
//!
//! Every query is scoped by the `:OWNER` bind and, when a single table is
//! extracted, by `:TABLE_NAME`. Select lists are positional; the column
//! index constants below are the only place the extractor learns them.

use crate::error::MetadataClass;

/// Bind carrying the schema name.
pub(crate) const OWNER_BIND: &str = "OWNER";
/// Bind carrying the table name for single-table extraction.
pub(crate) const TABLE_BIND: &str = "TABLE_NAME";

/// Select list of the tables query.
pub(crate) mod tables {
    pub(crate) const TABLE_NAME: usize = 0;
    pub(crate) const COMMENTS: usize = 1;
}

/// Select list of the columns query.
pub(crate) mod columns {
    pub(crate) const TABLE_NAME: usize = 0;
    pub(crate) const COLUMN_NAME: usize = 1;
    pub(crate) const DATA_TYPE: usize = 2;
    pub(crate) const DATA_LENGTH: usize = 3;
    pub(crate) const DATA_PRECISION: usize = 4;
    pub(crate) const DATA_SCALE: usize = 5;
    pub(crate) const CHAR_LENGTH: usize = 6;
    pub(crate) const CHAR_USED: usize = 7;
    pub(crate) const NULLABLE: usize = 8;
    pub(crate) const DATA_DEFAULT: usize = 9;
    pub(crate) const COLUMN_ID: usize = 10;
    pub(crate) const COMMENTS: usize = 11;
}

/// Select list of the constraints query.
pub(crate) mod constraints {
    pub(crate) const TABLE_NAME: usize = 0;
    pub(crate) const CONSTRAINT_NAME: usize = 1;
    pub(crate) const CONSTRAINT_TYPE: usize = 2;
    pub(crate) const SEARCH_CONDITION: usize = 3;
    pub(crate) const STATUS: usize = 4;
    pub(crate) const DELETE_RULE: usize = 5;
    pub(crate) const GENERATED: usize = 6;
    pub(crate) const R_OWNER: usize = 7;
    pub(crate) const R_TABLE_NAME: usize = 8;
    pub(crate) const COLUMN_NAME: usize = 9;
    pub(crate) const R_COLUMN_NAME: usize = 10;
}

/// Select list of the indexes query.
pub(crate) mod indexes {
    pub(crate) const TABLE_NAME: usize = 0;
    pub(crate) const INDEX_NAME: usize = 1;
    pub(crate) const UNIQUENESS: usize = 2;
    pub(crate) const TABLESPACE_NAME: usize = 3;
    pub(crate) const DEGREE: usize = 4;
    pub(crate) const COLUMN_NAME: usize = 5;
}

const TABLES: &str = "SELECT t.TABLE_NAME, c.COMMENTS \
FROM ALL_TABLES t \
LEFT JOIN ALL_TAB_COMMENTS c ON c.OWNER = t.OWNER AND c.TABLE_NAME = t.TABLE_NAME \
WHERE t.OWNER = :OWNER";

const COLUMNS: &str = "SELECT c.TABLE_NAME, c.COLUMN_NAME, c.DATA_TYPE, c.DATA_LENGTH, \
c.DATA_PRECISION, c.DATA_SCALE, c.CHAR_LENGTH, c.CHAR_USED, c.NULLABLE, c.DATA_DEFAULT, \
c.COLUMN_ID, m.COMMENTS \
FROM ALL_TAB_COLUMNS c \
JOIN ALL_TABLES t ON t.OWNER = c.OWNER AND t.TABLE_NAME = c.TABLE_NAME \
LEFT JOIN ALL_COL_COMMENTS m ON m.OWNER = c.OWNER AND m.TABLE_NAME = c.TABLE_NAME \
AND m.COLUMN_NAME = c.COLUMN_NAME \
WHERE c.OWNER = :OWNER";

const CONSTRAINTS: &str = "SELECT c.TABLE_NAME, c.CONSTRAINT_NAME, c.CONSTRAINT_TYPE, \
c.SEARCH_CONDITION, c.STATUS, c.DELETE_RULE, c.GENERATED, r.OWNER, r.TABLE_NAME, \
cc.COLUMN_NAME, rc.COLUMN_NAME \
FROM ALL_CONSTRAINTS c \
JOIN ALL_CONS_COLUMNS cc ON cc.OWNER = c.OWNER AND cc.CONSTRAINT_NAME = c.CONSTRAINT_NAME \
AND cc.TABLE_NAME = c.TABLE_NAME \
LEFT JOIN ALL_CONSTRAINTS r ON r.OWNER = c.R_OWNER AND r.CONSTRAINT_NAME = c.R_CONSTRAINT_NAME \
LEFT JOIN ALL_CONS_COLUMNS rc ON rc.OWNER = r.OWNER AND rc.CONSTRAINT_NAME = r.CONSTRAINT_NAME \
AND rc.POSITION = cc.POSITION \
WHERE c.OWNER = :OWNER AND c.CONSTRAINT_TYPE IN ('P', 'U', 'R', 'C')";

const INDEXES: &str = "SELECT i.TABLE_NAME, i.INDEX_NAME, i.UNIQUENESS, i.TABLESPACE_NAME, \
i.DEGREE, ic.COLUMN_NAME \
FROM ALL_INDEXES i \
JOIN ALL_IND_COLUMNS ic ON ic.INDEX_OWNER = i.OWNER AND ic.INDEX_NAME = i.INDEX_NAME \
WHERE i.OWNER = :OWNER AND i.TABLE_OWNER = :OWNER AND i.INDEX_TYPE IN ('NORMAL', 'NORMAL/REV')";

/// Returns the query for a metadata class, optionally restricted to one
/// table.
pub(crate) fn catalog_query(class: MetadataClass, single_table: bool) -> String {
    let (base, alias, order) = match class {
        MetadataClass::Tables => (TABLES, "t", "t.TABLE_NAME"),
        MetadataClass::Columns => (COLUMNS, "c", "c.TABLE_NAME, c.COLUMN_ID"),
        MetadataClass::Constraints => (
            CONSTRAINTS,
            "c",
            "c.TABLE_NAME, c.CONSTRAINT_NAME, cc.POSITION, cc.COLUMN_NAME",
        ),
        MetadataClass::Indexes => (
            INDEXES,
            "i",
            "i.TABLE_NAME, i.INDEX_NAME, ic.COLUMN_POSITION",
        ),
    };
    let mut sql = String::from(base);
    if single_table {
        sql.push_str(&format!(" AND {alias}.TABLE_NAME = :{TABLE_BIND}"));
    }
    sql.push_str(" ORDER BY ");
    sql.push_str(order);
    sql
}
