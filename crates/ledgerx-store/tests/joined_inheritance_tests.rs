#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{memory_settings, row_count};
use ledgerx_core::logging_facility::test_capture::init_test_capture;
use ledgerx_core::mapping::EntityDescriptor;
use ledgerx_core::model::CREDIT_ACCOUNT;
use ledgerx_core::{
    Account, AccountKind, AnyAccount, CreditAccount, DebitAccount, Entity, ExErrorKind, Row,
};
use ledgerx_store::config::{SchemaGeneration, Settings};
use ledgerx_store::provider::SessionProvider;
use ledgerx_store::session::SessionFactory;

fn factory() -> (SessionProvider, SessionFactory) {
    let provider = SessionProvider::new(memory_settings(SchemaGeneration::Create));
    let factory = provider.get_factory().unwrap();
    (provider, factory)
}

#[test]
fn test_subclass_insert_writes_base_and_own_table_only() {
    let (_provider, factory) = factory();
    let mut session = factory.open_session().unwrap();

    let mut credit = CreditAccount::new("ana", 250.0, 0.02, 1000.0);
    let id = session.persist(&mut credit).unwrap();
    assert_eq!(credit.account.id, Some(id));

    let conn = factory.registry().acquire().unwrap();
    assert_eq!(row_count(&conn, "account"), 1);
    assert_eq!(row_count(&conn, "credit_account"), 1);
    assert_eq!(row_count(&conn, "debit_account"), 0);

    let linked: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM account a JOIN credit_account c ON c.id = a.id WHERE a.id = ?1",
            [id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(linked, 1);
}

#[test]
fn test_subclass_query_reconstructs_through_join() {
    let (_provider, factory) = factory();
    let mut session = factory.open_session().unwrap();

    let mut debit = DebitAccount::new("bo", -20.0, 0.0, 35.0);
    let id = session.persist(&mut debit).unwrap();

    let loaded: DebitAccount = session.find(id).unwrap().expect("debit account");
    assert_eq!(loaded, debit);
    assert!(loaded.is_overdrawn());

    // the same id is not a credit account
    assert!(session.find::<CreditAccount>(id).unwrap().is_none());
    // but it is an account
    let base: Account = session.find(id).unwrap().expect("base view");
    assert_eq!(base.owner, "bo");
}

#[test]
fn test_polymorphic_query_returns_every_kind_without_discriminator() {
    let (_provider, factory) = factory();
    let mut session = factory.open_session().unwrap();

    let mut plain = Account::new("cy", 5.0, 0.0);
    let mut credit = CreditAccount::new("dee", 0.0, 0.03, 500.0);
    let mut debit = DebitAccount::new("eli", 40.0, 0.01, 2.5);
    session
        .transaction(|uow| {
            uow.persist(&mut plain)?;
            uow.persist(&mut credit)?;
            uow.persist(&mut debit)?;
            Ok(())
        })
        .unwrap();

    let all: Vec<AnyAccount> = session.list_polymorphic().unwrap();
    let kinds: Vec<AccountKind> = all.iter().map(AnyAccount::kind).collect();
    assert_eq!(
        kinds,
        vec![AccountKind::Plain, AccountKind::Credit, AccountKind::Debit]
    );
    assert_eq!(all[1], AnyAccount::Credit(credit.clone()));
    assert_eq!(all[2], AnyAccount::Debit(debit.clone()));

    let one: AnyAccount = session
        .find_polymorphic(credit.account.id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(one.kind(), AccountKind::Credit);
}

#[test]
fn test_list_by_subclass_and_count() {
    let (_provider, factory) = factory();
    let mut session = factory.open_session().unwrap();

    for i in 0..3 {
        session
            .persist(&mut CreditAccount::new(format!("c{}", i), 1.0, 0.0, 10.0))
            .unwrap();
    }
    session
        .persist(&mut DebitAccount::new("d", 1.0, 0.0, 1.0))
        .unwrap();

    let credits: Vec<CreditAccount> = session.list().unwrap();
    assert_eq!(credits.len(), 3);
    assert!(credits
        .windows(2)
        .all(|w| w[0].account.id < w[1].account.id));

    assert_eq!(session.count::<Account>().unwrap(), 4);
    assert_eq!(session.count::<CreditAccount>().unwrap(), 3);
    assert_eq!(session.count::<DebitAccount>().unwrap(), 1);
}

#[test]
fn test_update_touches_every_table_of_chain() {
    let (_provider, factory) = factory();
    let mut session = factory.open_session().unwrap();

    let mut credit = CreditAccount::new("fay", 10.0, 0.01, 100.0);
    let id = session.persist(&mut credit).unwrap();

    credit.account.balance = 75.5;
    credit.credit_limit = 900.0;
    session.update(&credit).unwrap();

    let loaded: CreditAccount = session.find(id).unwrap().unwrap();
    assert_eq!(loaded.account.balance, 75.5);
    assert_eq!(loaded.credit_limit, 900.0);
}

#[test]
fn test_update_missing_row_is_not_found() {
    let (_provider, factory) = factory();
    let mut session = factory.open_session().unwrap();

    let mut ghost = DebitAccount::new("gus", 0.0, 0.0, 1.0);
    ghost.account.id = Some(404);
    let err = session.update(&ghost).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.entity_id(), Some(404));

    let unsaved = DebitAccount::new("hal", 0.0, 0.0, 1.0);
    let err = session.update(&unsaved).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

/// Credit account whose row leaves out its own `credit_limit` column
struct LimitlessCredit(CreditAccount);

impl Entity for LimitlessCredit {
    fn descriptor() -> &'static EntityDescriptor {
        &CREDIT_ACCOUNT
    }

    fn id(&self) -> Option<i64> {
        self.0.id()
    }

    fn set_id(&mut self, id: i64) {
        self.0.set_id(id);
    }

    fn to_row(&self) -> Row {
        let full = self.0.to_row();
        let mut row = Row::with_id(full.id());
        for (column, value) in full.columns().filter(|(c, _)| c.as_str() != "credit_limit") {
            row.set(column.clone(), value.clone());
        }
        row
    }

    fn from_row(row: &Row) -> ledgerx_core::Result<Self> {
        CreditAccount::from_row(row).map(LimitlessCredit)
    }
}

#[test]
fn test_update_with_omitted_column_fails_and_writes_nothing() {
    let (_provider, factory) = factory();
    let mut session = factory.open_session().unwrap();

    let mut credit = CreditAccount::new("gil", 10.0, 0.01, 300.0);
    let id = session.persist(&mut credit).unwrap();

    credit.account.balance = 999.0;
    let err = session.update(&LimitlessCredit(credit)).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Serialization);
    assert_eq!(err.entity(), Some("CreditAccount"));

    let loaded: CreditAccount = session.find(id).unwrap().unwrap();
    assert_eq!(loaded.account.balance, 10.0);
    assert_eq!(loaded.credit_limit, 300.0);
}

#[test]
fn test_persist_with_omitted_column_fails() {
    let (_provider, factory) = factory();
    let mut session = factory.open_session().unwrap();

    let mut partial = LimitlessCredit(CreditAccount::new("hob", 1.0, 0.0, 5.0));
    let err = session.persist(&mut partial).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Serialization);
}

#[test]
fn test_remove_deletes_from_every_table() {
    let (_provider, factory) = factory();
    let mut session = factory.open_session().unwrap();

    let id = session
        .persist(&mut CreditAccount::new("ivy", 1.0, 0.0, 5.0))
        .unwrap();

    // removing through the base type also removes the subclass row
    assert!(session.remove::<Account>(id).unwrap());
    assert!(!session.remove::<Account>(id).unwrap());

    let conn = factory.registry().acquire().unwrap();
    assert_eq!(row_count(&conn, "account"), 0);
    assert_eq!(row_count(&conn, "credit_account"), 0);
}

#[test]
fn test_remove_as_wrong_subclass_is_noop() {
    let (_provider, factory) = factory();
    let mut session = factory.open_session().unwrap();

    let id = session
        .persist(&mut DebitAccount::new("jo", 1.0, 0.0, 5.0))
        .unwrap();
    assert!(!session.remove::<CreditAccount>(id).unwrap());
    assert_eq!(session.count::<DebitAccount>().unwrap(), 1);
}

#[test]
fn test_failed_transaction_rolls_back_all_tables() {
    let (_provider, factory) = factory();
    let mut session = factory.open_session().unwrap();

    let mut first = CreditAccount::new("kai", 1.0, 0.0, 5.0);
    let result = session.transaction(|uow| {
        let id = uow.persist(&mut first)?;
        // duplicate id violates the primary key
        let mut clash = DebitAccount::new("lea", 1.0, 0.0, 5.0);
        clash.account.id = Some(id);
        uow.persist(&mut clash)?;
        Ok(())
    });

    assert_eq!(result.unwrap_err().kind(), ExErrorKind::Persistence);
    assert_eq!(session.count::<Account>().unwrap(), 0);
}

#[test]
fn test_row_in_two_sibling_tables_is_ambiguous() {
    let (_provider, factory) = factory();
    let conn = factory.registry().acquire().unwrap();
    conn.execute_batch(
        "INSERT INTO account (id, owner, balance, interest_rate) VALUES (7, 'max', 0, 0);
         INSERT INTO credit_account (id, credit_limit) VALUES (7, 10);
         INSERT INTO debit_account (id, overdraft_fee) VALUES (7, 1);",
    )
    .unwrap();

    let mut session = factory.open_session().unwrap();
    let err = session.find_polymorphic::<AnyAccount>(7).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvariantViolation);
    assert_eq!(err.entity_id(), Some(7));
}

#[test]
fn test_subclass_row_requires_base_row() {
    let (_provider, factory) = factory();
    let conn = factory.registry().acquire().unwrap();

    let orphan = conn.execute(
        "INSERT INTO credit_account (id, credit_limit) VALUES (99, 1.0)",
        [],
    );
    assert!(orphan.is_err(), "foreign key must reject an orphan subclass row");
}

#[test]
fn test_show_sql_emits_statement_events() {
    let capture = init_test_capture();
    let settings = Settings {
        show_sql: true,
        ..memory_settings(SchemaGeneration::Create)
    };
    let provider = SessionProvider::new(settings);
    let mut session = provider.get_factory().unwrap().open_session().unwrap();

    session
        .persist(&mut DebitAccount::new("ned", 1.0, 0.0, 5.0))
        .unwrap();

    let session_id = session.id().as_str().to_string();
    let statements: Vec<String> = capture
        .events_for_target("ledgerx::sql")
        .into_iter()
        .filter(|e| e.fields.get("scope") == Some(&session_id))
        .filter_map(|e| e.fields.get("sql").cloned())
        .collect();

    assert_eq!(statements.len(), 2, "one insert per table: {:?}", statements);
    assert!(statements[0].starts_with("INSERT INTO account"));
    assert!(statements[1].starts_with("INSERT INTO debit_account"));
}

#[test]
fn test_sessions_fail_once_factory_closed() {
    let (provider, factory) = factory();
    let mut session = factory.open_session().unwrap();
    assert!(provider.shutdown());

    let err = factory.open_session().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::RegistryDestroyed);
    let err = session.count::<Account>().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::RegistryDestroyed);
}
