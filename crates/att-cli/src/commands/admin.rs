//! Directory administration: organizations, system identities and staff.

use std::io::Write;

use anyhow::Result;
use att_core::{OrgId, StaffId, SystemId};
use att_db::{Database, DbError, NewStaff};
use serde::Serialize;

use super::{Disposition, reject, rejection, write_json};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationCreated {
    id: OrgId,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SystemRegistered {
    id: SystemId,
    org_id: OrgId,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BadgeChanged {
    staff_id: StaffId,
    badge_active: bool,
}

/// Writes the JSON for `result`, or a structured failure for a rejection.
fn respond<W: Write, T: Serialize>(writer: &mut W, result: Result<T, DbError>) -> Result<Disposition> {
    match result {
        Ok(value) => {
            write_json(writer, &value)?;
            Ok(Disposition::Accepted)
        }
        Err(err) => reject(writer, &rejection(err)?),
    }
}

pub fn create_org<W: Write>(
    writer: &mut W,
    db: &mut Database,
    name: &str,
    id: Option<&str>,
) -> Result<Disposition> {
    let result = db
        .create_organization(id, name)
        .map(|org| OrganizationCreated {
            id: org.id,
            name: org.name,
        });
    respond(writer, result)
}

pub fn list_orgs<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let orgs = db.list_organizations()?;
    if orgs.is_empty() {
        writeln!(writer, "No organizations.")?;
        return Ok(());
    }
    for org in orgs {
        writeln!(writer, "{}  {}", org.id, org.name)?;
    }
    Ok(())
}

pub fn register_system<W: Write>(
    writer: &mut W,
    db: &mut Database,
    org: &str,
    label: Option<&str>,
) -> Result<Disposition> {
    let result = OrgId::new(org).map_err(DbError::from).and_then(|org_id| {
        let id = db.register_system(&org_id, label)?;
        Ok(SystemRegistered {
            id,
            org_id,
            label: label.map(str::to_string),
        })
    });
    respond(writer, result)
}

pub fn add_staff<W: Write>(
    writer: &mut W,
    db: &mut Database,
    org: &str,
    name: &str,
    code: Option<&str>,
    email: Option<&str>,
) -> Result<Disposition> {
    let result = OrgId::new(org).map_err(DbError::from).and_then(|org_id| {
        db.add_staff(&NewStaff {
            org_id,
            name: name.to_string(),
            employee_code: code.map(str::to_string),
            email: email.map(str::to_string),
        })
    });
    respond(writer, result)
}

pub fn set_badge<W: Write>(
    writer: &mut W,
    db: &mut Database,
    staff_id: &str,
    active: bool,
) -> Result<Disposition> {
    let result = StaffId::new(staff_id).map_err(DbError::from).and_then(|staff_id| {
        db.set_badge_active(&staff_id, active)?;
        Ok(BadgeChanged {
            staff_id,
            badge_active: active,
        })
    });
    respond(writer, result)
}
