//! Device multicast-group membership
//!
//! Stores which devices belong to which multicast groups. A membership is
//! just the (dev_eui, multicast_group_id) pair plus the time it was created
//! or last re-affirmed.
//!
//! # Write semantics
//!
//! - `add_device_to_multicast_group` is a plain insert. Adding the same pair
//!   twice fails with `StoreError::Conflict`.
//! - `batch_add_devices_to_multicast_group` upserts every device inside one
//!   transaction. Existing pairs get their `created_at` refreshed, so the
//!   batch can be re-run with overlapping device sets. Any failure rolls the
//!   whole batch back.
//! - `remove_device_from_multicast_group` fails with `StoreError::NotFound`
//!   when no row matched.
//!
//! Every function takes the caller's [`RequestContext`]. The cancellation
//! token is checked before each statement, and the correlation id is logged
//! as `ctx_id` on membership changes.

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use tracing::info;
use uuid::Uuid;

use super::dev_eui::DevEui;
use crate::context::RequestContext;
use crate::data::current_timestamp_millis;
use crate::data::error::{handle_sqlite_error, StoreError};

const UPSERT_MEMBER_SQL: &str =
    "INSERT INTO device_multicast_group (dev_eui, multicast_group_id, created_at)
     VALUES (?1, ?2, ?3)
     ON CONFLICT(dev_eui, multicast_group_id) DO UPDATE SET created_at = excluded.created_at";

/// A membership row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMulticastGroup {
    pub dev_eui: DevEui,
    pub multicast_group_id: Uuid,
    /// Unix milliseconds of the add or the last batch re-affirmation
    pub created_at: i64,
}

/// Add a device to a multicast-group
///
/// Not idempotent: a second call for the same pair returns
/// `StoreError::Conflict`.
pub fn add_device_to_multicast_group(
    ctx: &RequestContext,
    conn: &Connection,
    dev_eui: &DevEui,
    multicast_group_id: &Uuid,
) -> Result<(), StoreError> {
    ctx.check_cancelled()
        .and_then(|_| {
            conn.execute(
                "INSERT INTO device_multicast_group (dev_eui, multicast_group_id, created_at)
                 VALUES (?1, ?2, ?3)",
                params![
                    dev_eui.as_bytes().as_slice(),
                    multicast_group_id.as_bytes().as_slice(),
                    current_timestamp_millis(),
                ],
            )
        })
        .map_err(|e| handle_sqlite_error(e, "insert error"))?;

    info!(
        dev_eui = %dev_eui,
        multicast_group_id = %multicast_group_id,
        ctx_id = ctx.id(),
        "device added to multicast-group"
    );

    Ok(())
}

/// Add many devices to one multicast-group atomically
///
/// Each device is upserted, so duplicates in `dev_euis` and devices that are
/// already members are fine. Either every device ends up a member or, on
/// error, nothing changed. An empty slice commits an empty transaction.
///
/// The token is checked before BEGIN, before each device and before COMMIT.
/// Waiting for the write lock in BEGIN IMMEDIATE is bounded by the
/// connection's busy timeout, not by the token, so a caller cancelled during
/// that wait is only noticed once the lock is taken.
pub fn batch_add_devices_to_multicast_group(
    ctx: &RequestContext,
    conn: &mut Connection,
    dev_euis: &[DevEui],
    multicast_group_id: &Uuid,
) -> Result<(), StoreError> {
    ctx.check_cancelled()
        .map_err(|e| handle_sqlite_error(e, "begin transaction error"))?;
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| handle_sqlite_error(e, "begin transaction error"))?;

    if let Err(e) = upsert_members(ctx, &tx, dev_euis, multicast_group_id) {
        // rollback errors are dropped, the caller gets the upsert failure
        let _ = tx.rollback();
        return Err(e);
    }

    if let Err(e) = ctx.check_cancelled() {
        let _ = tx.rollback();
        return Err(handle_sqlite_error(e, "tx commit error"));
    }

    // If COMMIT fails the transaction is still open and dropping `tx` rolls it back
    tx.commit()
        .map_err(|e| handle_sqlite_error(e, "tx commit error"))
}

/// Run the batch upsert on one prepared statement
///
/// The statement is finalized before returning on every path, so it never
/// outlives the transaction.
fn upsert_members(
    ctx: &RequestContext,
    tx: &Transaction<'_>,
    dev_euis: &[DevEui],
    multicast_group_id: &Uuid,
) -> Result<(), StoreError> {
    let mut stmt = tx
        .prepare(UPSERT_MEMBER_SQL)
        .map_err(|e| handle_sqlite_error(e, "prepare error"))?;

    for dev_eui in dev_euis {
        ctx.check_cancelled()
            .and_then(|_| {
                stmt.execute(params![
                    dev_eui.as_bytes().as_slice(),
                    multicast_group_id.as_bytes().as_slice(),
                    current_timestamp_millis(),
                ])
            })
            .map_err(|e| handle_sqlite_error(e, "insert or update error"))?;

        info!(
            dev_eui = %dev_eui,
            multicast_group_id = %multicast_group_id,
            ctx_id = ctx.id(),
            "device added to multicast-group"
        );
    }

    stmt.finalize()
        .map_err(|e| handle_sqlite_error(e, "stmt close error"))
}

/// Remove a device from a multicast-group
///
/// Returns `StoreError::NotFound` if the device wasn't a member.
pub fn remove_device_from_multicast_group(
    ctx: &RequestContext,
    conn: &Connection,
    dev_eui: &DevEui,
    multicast_group_id: &Uuid,
) -> Result<(), StoreError> {
    let rows = ctx
        .check_cancelled()
        .and_then(|_| {
            conn.execute(
                "DELETE FROM device_multicast_group
                 WHERE dev_eui = ?1
                   AND multicast_group_id = ?2",
                params![
                    dev_eui.as_bytes().as_slice(),
                    multicast_group_id.as_bytes().as_slice(),
                ],
            )
        })
        .map_err(|e| handle_sqlite_error(e, "delete error"))?;

    if rows == 0 {
        return Err(StoreError::NotFound);
    }

    info!(
        dev_eui = %dev_eui,
        multicast_group_id = %multicast_group_id,
        ctx_id = ctx.id(),
        "device removed from multicast-group"
    );

    Ok(())
}

/// Get the multicast-group ids the given device belongs to
pub fn get_multicast_groups_for_dev_eui(
    ctx: &RequestContext,
    conn: &Connection,
    dev_eui: &DevEui,
) -> Result<Vec<Uuid>, StoreError> {
    let query = || -> rusqlite::Result<Vec<Uuid>> {
        ctx.check_cancelled()?;
        let mut stmt = conn.prepare(
            "SELECT multicast_group_id
             FROM device_multicast_group
             WHERE dev_eui = ?1",
        )?;

        let groups = stmt
            .query_map([dev_eui.as_bytes().as_slice()], |row| parse_group_id(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(groups)
    };

    query().map_err(|e| handle_sqlite_error(e, "select error"))
}

/// Get all devices within the given multicast-group
pub fn get_dev_euis_for_multicast_group(
    ctx: &RequestContext,
    conn: &Connection,
    multicast_group_id: &Uuid,
) -> Result<Vec<DevEui>, StoreError> {
    let query = || -> rusqlite::Result<Vec<DevEui>> {
        ctx.check_cancelled()?;
        let mut stmt = conn.prepare(
            "SELECT dev_eui
             FROM device_multicast_group
             WHERE multicast_group_id = ?1",
        )?;

        let devices = stmt
            .query_map([multicast_group_id.as_bytes().as_slice()], |row| {
                parse_dev_eui(row, 0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(devices)
    };

    query().map_err(|e| handle_sqlite_error(e, "select error"))
}

/// Get a single membership row
///
/// Returns `StoreError::NotFound` if the device isn't a member.
pub fn get_device_multicast_group(
    ctx: &RequestContext,
    conn: &Connection,
    dev_eui: &DevEui,
    multicast_group_id: &Uuid,
) -> Result<DeviceMulticastGroup, StoreError> {
    ctx.check_cancelled()
        .and_then(|_| {
            conn.query_row(
                "SELECT dev_eui, multicast_group_id, created_at
                 FROM device_multicast_group
                 WHERE dev_eui = ?1
                   AND multicast_group_id = ?2",
                params![
                    dev_eui.as_bytes().as_slice(),
                    multicast_group_id.as_bytes().as_slice(),
                ],
                parse_membership_row,
            )
        })
        .map_err(|e| handle_sqlite_error(e, "select error"))
}

/// Check if a device is a member of a multicast-group
pub fn is_device_in_multicast_group(
    ctx: &RequestContext,
    conn: &Connection,
    dev_eui: &DevEui,
    multicast_group_id: &Uuid,
) -> Result<bool, StoreError> {
    let count: i64 = ctx
        .check_cancelled()
        .and_then(|_| {
            conn.query_row(
                "SELECT COUNT(*) FROM device_multicast_group
                 WHERE dev_eui = ?1
                   AND multicast_group_id = ?2",
                params![
                    dev_eui.as_bytes().as_slice(),
                    multicast_group_id.as_bytes().as_slice(),
                ],
                |row| row.get(0),
            )
        })
        .map_err(|e| handle_sqlite_error(e, "select error"))?;

    Ok(count > 0)
}

/// Get member count for a multicast-group
pub fn get_multicast_group_member_count(
    ctx: &RequestContext,
    conn: &Connection,
    multicast_group_id: &Uuid,
) -> Result<usize, StoreError> {
    let count: i64 = ctx
        .check_cancelled()
        .and_then(|_| {
            conn.query_row(
                "SELECT COUNT(*) FROM device_multicast_group WHERE multicast_group_id = ?1",
                [multicast_group_id.as_bytes().as_slice()],
                |row| row.get(0),
            )
        })
        .map_err(|e| handle_sqlite_error(e, "select error"))?;

    Ok(count as usize)
}

fn invalid_blob(index: usize, name: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(index, name.to_string(), Type::Blob)
}

fn parse_dev_eui(row: &Row<'_>, index: usize) -> rusqlite::Result<DevEui> {
    let bytes: Vec<u8> = row.get(index)?;
    DevEui::from_slice(&bytes).map_err(|_| invalid_blob(index, "dev_eui"))
}

fn parse_group_id(row: &Row<'_>, index: usize) -> rusqlite::Result<Uuid> {
    let bytes: Vec<u8> = row.get(index)?;
    Uuid::from_slice(&bytes).map_err(|_| invalid_blob(index, "multicast_group_id"))
}

fn parse_membership_row(row: &Row<'_>) -> rusqlite::Result<DeviceMulticastGroup> {
    Ok(DeviceMulticastGroup {
        dev_eui: parse_dev_eui(row, 0)?,
        multicast_group_id: parse_group_id(row, 1)?,
        created_at: row.get(2)?,
    })
}
