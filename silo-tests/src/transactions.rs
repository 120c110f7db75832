use crate::fixtures::{Employee, EmployeeMeta, EMPLOYEE_SCHEMA};
use silo_core::{select_from, Connection, Database, Error, TransactionAttribute};

fn employee(id: i32, name: &str) -> Employee {
    Employee {
        employee_id: id,
        employee_name: name.to_owned(),
        manager_id: None,
    }
}

fn count_employees<C: Connection>(db: &mut Database<C>) -> usize {
    let e = EmployeeMeta::new();
    db.select(&e, select_from(&e)).expect("count employees").len()
}

pub fn commit_makes_writes_visible<C: Connection>(db: &mut Database<C>) {
    db.run_script(EMPLOYEE_SCHEMA).expect("employee schema");
    let e = EmployeeMeta::new();
    db.with_transaction(TransactionAttribute::Required, |db| {
        db.insert(&e, &employee(1, "FIRST"))?;
        Ok(())
    })
    .expect("transaction commits");
    assert_eq!(count_employees(db), 1);
}

/// Writes are visible to reads inside the same transaction before commit.
pub fn read_your_own_writes<C: Connection>(db: &mut Database<C>) {
    db.run_script(EMPLOYEE_SCHEMA).expect("employee schema");
    let e = EmployeeMeta::new();
    db.with_transaction(TransactionAttribute::Required, |db| {
        db.insert(&e, &employee(1, "FIRST"))?;
        db.insert(&e, &employee(2, "SECOND"))?;
        let inside = db.select(&e, select_from(&e))?;
        assert_eq!(inside.len(), 2);
        Ok(())
    })
    .expect("transaction commits");
}

/// Marking rollback-only keeps the work readable inside the transaction but
/// turns the commit at the boundary into a rollback.
pub fn rollback_only_discards_writes<C: Connection>(db: &mut Database<C>) {
    db.run_script(EMPLOYEE_SCHEMA).expect("employee schema");
    let e = EmployeeMeta::new();
    db.with_transaction(TransactionAttribute::Required, |db| {
        db.insert(&e, &employee(1, "FIRST"))?;
        db.set_rollback_only();
        assert!(db.is_rollback_only());
        // Still visible from inside.
        let inside = db.select(&e, select_from(&e))?;
        assert_eq!(inside.len(), 1);
        Ok(())
    })
    .expect("the scope itself succeeds");
    assert_eq!(count_employees(db), 0);
}

pub fn error_rolls_back<C: Connection>(db: &mut Database<C>) {
    db.run_script(EMPLOYEE_SCHEMA).expect("employee schema");
    let e = EmployeeMeta::new();
    let result: silo_core::Result<()> =
        db.with_transaction(TransactionAttribute::Required, |db| {
            db.insert(&e, &employee(1, "FIRST"))?;
            Err(Error::msg("boom"))
        });
    assert!(result.is_err());
    assert_eq!(count_employees(db), 0);
}

/// `Required` joins the enclosing transaction: the inner scope commits and
/// rolls back with the outer boundary.
pub fn required_joins_enclosing<C: Connection>(db: &mut Database<C>) {
    db.run_script(EMPLOYEE_SCHEMA).expect("employee schema");
    let e = EmployeeMeta::new();
    db.with_transaction(TransactionAttribute::Required, |db| {
        db.insert(&e, &employee(1, "OUTER"))?;
        db.with_transaction(TransactionAttribute::Required, |db| {
            db.insert(&e, &employee(2, "INNER"))?;
            Ok(())
        })?;
        db.set_rollback_only();
        Ok(())
    })
    .expect("scope succeeds");
    // Both writes belonged to the one joined transaction.
    assert_eq!(count_employees(db), 0);
}

/// `RequiresNew` suspends the enclosing transaction; its commit survives an
/// outer rollback.
pub fn requires_new_is_independent<C: Connection>(db: &mut Database<C>) {
    db.run_script(EMPLOYEE_SCHEMA).expect("employee schema");
    let e = EmployeeMeta::new();
    db.with_transaction(TransactionAttribute::Required, |db| {
        db.insert(&e, &employee(1, "OUTER"))?;
        db.with_transaction(TransactionAttribute::RequiresNew, |db| {
            db.insert(&e, &employee(2, "INNER"))?;
            Ok(())
        })?;
        db.set_rollback_only();
        Ok(())
    })
    .expect("scope succeeds");
    let e = EmployeeMeta::new();
    let survivors = db.select(&e, select_from(&e)).expect("select employees");
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].employee_id, 2);
}
