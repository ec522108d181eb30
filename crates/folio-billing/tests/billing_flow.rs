//! End-to-end workflow tests against a real (in-memory) SQLite database,
//! wired through the production adapters.

use folio_billing::{BillingConfig, BillingError, BillingService};
use folio_core::{
    BillDraft, BillStatus, LineDraft, PaymentMethod, PaymentStatus, Percent, ReferenceType,
};
use folio_db::repository::item::NewItem;
use folio_db::{Database, DbConfig};

struct World {
    db: Database,
    billing: BillingService,
    customer_id: String,
}

async fn setup() -> World {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let billing = BillingService::from_database(&db, BillingConfig::default());
    let customer = db
        .customers()
        .create("ACC-0001", "Nimal Perera", None, None, None)
        .await
        .unwrap();
    World {
        db,
        billing,
        customer_id: customer.id,
    }
}

async fn seed_item(world: &World, code: &str, price_cents: i64, stock: i64) -> String {
    let item = world
        .db
        .items()
        .create(NewItem {
            code: code.to_string(),
            name: format!("Book {code}"),
            description: None,
            price_cents,
            cost_cents: None,
            min_stock_level: 2,
            isbn: None,
            author: None,
        })
        .await
        .unwrap();
    world
        .db
        .stock_ledger()
        .record_receipt(&item.id, stock, ReferenceType::Initial, None, "seed")
        .await
        .unwrap();
    item.id
}

fn draft(world: &World, lines: Vec<LineDraft>) -> BillDraft {
    BillDraft {
        customer_id: world.customer_id.clone(),
        bill_number: None,
        discount: Percent::zero(),
        tax: None,
        payment_method: PaymentMethod::Cash,
        payment_status: PaymentStatus::Paid,
        notes: None,
        lines,
    }
}

fn line(item_id: &str, qty: i64, price: i64) -> LineDraft {
    LineDraft {
        item_id: item_id.to_string(),
        quantity: qty,
        unit_price_cents: price,
        discount: Percent::zero(),
    }
}

#[tokio::test]
async fn create_bill_worked_example() {
    let world = setup().await;
    let item_id = seed_item(&world, "BK-001", 1_000, 20).await;

    let mut d = draft(&world, vec![line(&item_id, 5, 1_000)]);
    d.lines[0].discount = Percent::from_percentage(10.0);
    d.tax = Some(Percent::from_percentage(10.0));

    let bill = world.billing.create_bill(d, "cashier").await.unwrap();

    // 5 x 10.00 = 50.00, line discount 10% = 5.00 → line total 45.00
    // tax 10% of 45.00 = 4.50 → total 49.50
    assert_eq!(bill.subtotal_cents, 4_500);
    assert_eq!(bill.tax_cents, 450);
    assert_eq!(bill.total_cents, 4_950);
    assert_eq!(bill.lines[0].discount_cents, 500);
    assert_eq!(bill.lines[0].line_total_cents, 4_500);

    // Persisted form matches the returned one.
    let loaded = world.billing.get_bill(&bill.id).await.unwrap();
    assert_eq!(loaded.total_cents, 4_950);
    assert_eq!(loaded.lines.len(), 1);
    assert_eq!(loaded.lines[0].code_snapshot, "BK-001");

    // The subtotal is the sum of line totals.
    let line_sum: i64 = loaded.lines.iter().map(|l| l.line_total_cents).sum();
    assert_eq!(loaded.subtotal_cents, line_sum);
    assert_eq!(
        loaded.total_cents,
        loaded.subtotal_cents - loaded.discount_cents + loaded.tax_cents
    );

    // Stock and aggregates moved.
    let item = world.db.items().get_by_id(&item_id).await.unwrap();
    assert_eq!(item.stock_quantity, 15);
    assert_eq!(item.total_sold, 5);
    assert_eq!(item.total_revenue_cents, 4_500);

    let customer = world
        .db
        .customers()
        .get_by_id(&world.customer_id)
        .await
        .unwrap();
    assert_eq!(customer.total_purchases_cents, 4_950);
    assert_eq!(customer.total_bills, 1);

    // Audit trail carries the creation.
    let audit = world.db.audit().for_entity("bill", &bill.id).await.unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "BILL_CREATED");
}

#[tokio::test]
async fn bill_numbers_follow_period_format_and_increase() {
    let world = setup().await;
    let item_id = seed_item(&world, "BK-002", 500, 50).await;

    let a = world
        .billing
        .create_bill(draft(&world, vec![line(&item_id, 1, 500)]), "cashier")
        .await
        .unwrap();
    let b = world
        .billing
        .create_bill(draft(&world, vec![line(&item_id, 1, 500)]), "cashier")
        .await
        .unwrap();

    let period = chrono::Utc::now().format("%Y%m").to_string();
    assert_eq!(a.bill_number, format!("BILL{period}000001"));
    assert_eq!(b.bill_number, format!("BILL{period}000002"));

    let by_number = world
        .billing
        .get_bill_by_number(&a.bill_number)
        .await
        .unwrap();
    assert_eq!(by_number.id, a.id);
}

#[tokio::test]
async fn failing_third_line_leaves_nothing_behind() {
    let world = setup().await;
    let a = seed_item(&world, "BK-010", 1_000, 10).await;
    let b = seed_item(&world, "BK-011", 1_000, 10).await;
    let c = seed_item(&world, "BK-012", 1_000, 1).await;

    let err = world
        .billing
        .create_bill(
            draft(
                &world,
                vec![line(&a, 2, 1_000), line(&b, 3, 1_000), line(&c, 5, 1_000)],
            ),
            "cashier",
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BillingError::InsufficientStock {
            available: 1,
            requested: 5,
            ..
        }
    ));

    // Stock restored everywhere, no bill persisted, aggregates untouched.
    for (item_id, expected) in [(&a, 10), (&b, 10), (&c, 1)] {
        let item = world.db.items().get_by_id(item_id).await.unwrap();
        assert_eq!(item.stock_quantity, expected);
        assert_eq!(item.total_sold, 0);
        // Ledger still reconciles after the debit/restore round trip.
        assert_eq!(
            world.db.stock_ledger().quantity_sum(item_id).await.unwrap(),
            item.stock_quantity
        );
    }

    let page = world.billing.list_bills(0, 50).await.unwrap();
    assert_eq!(page.total_count, 0);

    let customer = world
        .db
        .customers()
        .get_by_id(&world.customer_id)
        .await
        .unwrap();
    assert_eq!(customer.total_bills, 0);
}

#[tokio::test]
async fn concurrent_last_unit_sells_exactly_once() {
    let world = setup().await;
    let item_id = seed_item(&world, "BK-020", 1_000, 1).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let billing = world.billing.clone();
        let d = draft(&world, vec![line(&item_id, 1, 1_000)]);
        handles.push(tokio::spawn(
            async move { billing.create_bill(d, "cashier").await },
        ));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(BillingError::InsufficientStock { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(successes, 1);

    let item = world.db.items().get_by_id(&item_id).await.unwrap();
    assert_eq!(item.stock_quantity, 0);
    assert_eq!(item.total_sold, 1);
}

#[tokio::test]
async fn cancel_is_the_inverse_of_create() {
    let world = setup().await;
    let a = seed_item(&world, "BK-030", 1_200, 10).await;
    let b = seed_item(&world, "BK-031", 800, 10).await;

    let bill = world
        .billing
        .create_bill(
            draft(&world, vec![line(&a, 3, 1_200), line(&b, 2, 800)]),
            "cashier",
        )
        .await
        .unwrap();

    let cancelled = world.billing.cancel_bill(&bill.id, "manager").await.unwrap();
    assert_eq!(cancelled.status, BillStatus::Cancelled);
    // Monetary amounts are frozen, not recomputed.
    assert_eq!(cancelled.total_cents, bill.total_cents);
    assert_eq!(cancelled.subtotal_cents, bill.subtotal_cents);

    for item_id in [&a, &b] {
        let item = world.db.items().get_by_id(item_id).await.unwrap();
        assert_eq!(item.stock_quantity, 10);
        assert_eq!(item.total_sold, 0);
        assert_eq!(item.total_revenue_cents, 0);
    }

    // Ledger shows matched OUT/RETURN pairs referencing this bill.
    let sales = world
        .db
        .stock_ledger()
        .movements_for_reference(ReferenceType::Sale, &bill.id)
        .await
        .unwrap();
    let returns = world
        .db
        .stock_ledger()
        .movements_for_reference(ReferenceType::Return, &bill.id)
        .await
        .unwrap();
    assert_eq!(sales.len(), 2);
    assert_eq!(returns.len(), 2);
    let out_sum: i64 = sales.iter().map(|m| m.quantity).sum();
    let back_sum: i64 = returns.iter().map(|m| m.quantity).sum();
    assert_eq!(out_sum, -5);
    assert_eq!(back_sum, 5);

    // Customer aggregates reversed.
    let customer = world
        .db
        .customers()
        .get_by_id(&world.customer_id)
        .await
        .unwrap();
    assert_eq!(customer.total_purchases_cents, 0);
    assert_eq!(customer.total_bills, 0);
}

#[tokio::test]
async fn second_cancel_is_rejected_without_new_movements() {
    let world = setup().await;
    let item_id = seed_item(&world, "BK-040", 900, 5).await;

    let bill = world
        .billing
        .create_bill(draft(&world, vec![line(&item_id, 2, 900)]), "cashier")
        .await
        .unwrap();
    world.billing.cancel_bill(&bill.id, "manager").await.unwrap();

    let before = world
        .db
        .stock_ledger()
        .movements_for_item(&item_id, 100)
        .await
        .unwrap()
        .len();

    let err = world
        .billing
        .cancel_bill(&bill.id, "manager")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BillingError::InvalidState {
            status: BillStatus::Cancelled,
            ..
        }
    ));

    let after = world
        .db
        .stock_ledger()
        .movements_for_item(&item_id, 100)
        .await
        .unwrap()
        .len();
    assert_eq!(before, after);

    let item = world.db.items().get_by_id(&item_id).await.unwrap();
    assert_eq!(item.stock_quantity, 5);
}

#[tokio::test]
async fn ledger_reconciles_across_a_full_day() {
    let world = setup().await;
    let item_id = seed_item(&world, "BK-050", 1_000, 30).await;

    // A mix of sales, a cancellation and a manual adjustment.
    let bill_a = world
        .billing
        .create_bill(draft(&world, vec![line(&item_id, 4, 1_000)]), "cashier")
        .await
        .unwrap();
    world
        .billing
        .create_bill(draft(&world, vec![line(&item_id, 7, 1_000)]), "cashier")
        .await
        .unwrap();
    world.billing.cancel_bill(&bill_a.id, "manager").await.unwrap();
    world
        .db
        .stock_ledger()
        .record_adjustment(&item_id, -2, Some("damaged copies"), "manager")
        .await
        .unwrap();

    let item = world.db.items().get_by_id(&item_id).await.unwrap();
    // 30 - 4 - 7 + 4 - 2
    assert_eq!(item.stock_quantity, 21);
    assert_eq!(
        world.db.stock_ledger().quantity_sum(&item_id).await.unwrap(),
        item.stock_quantity
    );
}

#[tokio::test]
async fn listing_bills_for_customer_pages_newest_first() {
    let world = setup().await;
    let item_id = seed_item(&world, "BK-060", 400, 100).await;

    let mut created = Vec::new();
    for _ in 0..5 {
        created.push(
            world
                .billing
                .create_bill(draft(&world, vec![line(&item_id, 1, 400)]), "cashier")
                .await
                .unwrap(),
        );
    }

    let page = world
        .billing
        .list_bills_for_customer(&world.customer_id, 0, 3)
        .await
        .unwrap();
    assert_eq!(page.total_count, 5);
    assert_eq!(page.bills.len(), 3);

    let rest = world
        .billing
        .list_bills_for_customer(&world.customer_id, 1, 3)
        .await
        .unwrap();
    assert_eq!(rest.bills.len(), 2);
}

#[tokio::test]
async fn inactive_item_is_rejected() {
    let world = setup().await;
    let item_id = seed_item(&world, "BK-070", 600, 10).await;
    world.db.items().deactivate(&item_id).await.unwrap();

    let err = world
        .billing
        .create_bill(draft(&world, vec![line(&item_id, 1, 600)]), "cashier")
        .await
        .unwrap_err();
    assert!(matches!(err, BillingError::ItemInactive(_)));

    let item = world.db.items().get_by_id(&item_id).await.unwrap();
    assert_eq!(item.stock_quantity, 10);
}
