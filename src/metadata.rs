use anyhow::{Context, Result};
use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;

/// Date and revision shared by the database header and the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stamp {
    pub date: String,
    pub revision: i64,
}

impl Stamp {
    pub fn now() -> Result<Self> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self::at(now)
    }

    pub fn at(moment: OffsetDateTime) -> Result<Self> {
        Ok(Self {
            date: format_date(moment)?,
            revision: moment.unix_timestamp(),
        })
    }
}

pub fn format_date(moment: OffsetDateTime) -> Result<String> {
    moment
        .format(format_description!("[year]-[month]-[day]"))
        .context("Failed to format generation date")
}

/// First line of the database artifact.
#[derive(Debug, Serialize)]
pub struct DatabaseHeader<'a> {
    #[serde(rename = "_meta")]
    pub meta: DatabaseMeta<'a>,
}

#[derive(Debug, Serialize)]
pub struct DatabaseMeta<'a> {
    pub name: &'a str,
    pub date: &'a str,
    pub revision: i64,
}

impl<'a> DatabaseHeader<'a> {
    pub fn new(name: &'a str, stamp: &'a Stamp) -> Self {
        Self {
            meta: DatabaseMeta {
                name,
                date: &stamp.date,
                revision: stamp.revision,
            },
        }
    }
}
