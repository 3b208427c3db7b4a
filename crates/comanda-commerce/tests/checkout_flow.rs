//! End-to-end ordering scenarios driven through the storefront with
//! in-process collaborators.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};

use comanda_commerce::checkout::PaymentMethods;
use comanda_commerce::prelude::*;

fn usd(cents: i64) -> Money {
    Money::new(cents, Currency::USD)
}

fn local(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

struct Kitchen {
    catalog: CatalogSnapshot,
    fail_insert: bool,
    orders: Mutex<Vec<Order>>,
}

impl Kitchen {
    fn new(fail_insert: bool) -> Self {
        Self {
            catalog: catalog(),
            fail_insert,
            orders: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DataStore for Kitchen {
    async fn fetch_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.catalog.products.clone())
    }
    async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.catalog.categories.clone())
    }
    async fn fetch_personalization_groups(&self) -> Result<Vec<PersonalizationGroup>, StoreError> {
        Ok(self.catalog.personalization_groups.clone())
    }
    async fn fetch_active_promotions(&self) -> Result<Vec<Promotion>, StoreError> {
        Ok(self.catalog.promotions.clone())
    }
    async fn fetch_settings(&self) -> Result<AppSettings, StoreError> {
        Ok(self.catalog.settings.clone())
    }
    async fn insert_order(&self, order: &Order) -> Result<OrderId, StoreError> {
        if self.fail_insert {
            return Err(StoreError::Unavailable("database offline".into()));
        }
        let mut orders = self.orders.lock().unwrap();
        let id = OrderId::new(format!("ord-{:06}", orders.len() + 1));
        let mut stored = order.clone();
        stored.id = id.clone();
        orders.push(stored);
        Ok(id)
    }
    async fn update_order(&self, id: &OrderId, patch: &OrderPatch) -> Result<Order, StoreError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        order
            .apply_patch(patch, Utc::now())
            .map_err(|e| StoreError::Rejected(e.to_string()))?;
        Ok(order.clone())
    }
    async fn fetch_active_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.is_active())
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct Outbox {
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl MessageDispatch for Outbox {
    async fn dispatch(&self, _destination: &str, payload: &str) -> Result<(), DispatchError> {
        self.messages.lock().unwrap().push(payload.to_string());
        Ok(())
    }
}

fn catalog() -> CatalogSnapshot {
    CatalogSnapshot {
        products: vec![
            Product::new("bagel", "Bagel", usd(500))
                .in_category("bakery")
                .with_personalization("spread"),
            Product::new("latte", "Latte", usd(350))
                .in_category("drinks")
                .with_personalization("milk"),
            Product::new("mocha", "Mocha", usd(350)).in_category("drinks"),
        ],
        categories: vec![
            Category::new("bakery", "Bakery"),
            Category::new("drinks", "Drinks").at_position(1),
        ],
        personalization_groups: vec![
            PersonalizationGroup::new("milk", "Milk")
                .with_bounds(0, Some(1))
                .with_option(PersonalizationOption::new("whole", "Whole", usd(0)))
                .with_option(PersonalizationOption::new("oat", "Oat", usd(75)))
                .with_option(PersonalizationOption::new("soy", "Soy", usd(50)).unavailable()),
            PersonalizationGroup::new("spread", "Spread")
                .with_bounds(0, Some(2))
                .with_option(PersonalizationOption::new("butter", "Butter", usd(0)))
                .with_option(PersonalizationOption::new("jam", "Jam", usd(25)))
                .with_option(PersonalizationOption::new("cheese", "Cream cheese", usd(100))),
        ],
        promotions: vec![
            Promotion::new(
                "breakfast",
                "Breakfast deal",
                PromotionDiscount::Percentage(20.0),
                PromotionScope::SpecificProducts(vec![ProductId::new("bagel")]),
            )
            .between(None, NaiveDate::from_ymd_opt(2026, 6, 15)),
        ],
        settings: AppSettings {
            restaurant_name: "Corner Cafe".into(),
            currency: Currency::USD,
            messaging_destination: "+15550100".into(),
            shipping: ShippingPolicy {
                cost_type: ShippingCostType::Fixed,
                fixed_cost: usd(200),
            },
            payment_methods: PaymentMethods {
                dine_in: vec![],
                take_away: vec![],
                delivery: vec!["Cash".into()],
            },
            ..AppSettings::default()
        },
        fetched_at: Utc::now(),
    }
}

fn delivery_form() -> CheckoutForm {
    CheckoutForm::new(
        CustomerInfo::new("Ana").with_phone("555-0101"),
        Fulfillment::Delivery {
            address: DeliveryAddress::new("Calle 5 #12"),
        },
        "Cash",
    )
    .with_tip(usd(100))
}

/// Two lines worth 8.00 and 3.50.
fn fill_cart(storefront: &mut Storefront, now: NaiveDateTime) {
    let bagel = ProductId::new("bagel");
    let selector = storefront.open_selector(&bagel).unwrap();
    storefront.add_to_cart(&bagel, &selector, 2, None, now).unwrap();

    let mocha = ProductId::new("mocha");
    let selector = storefront.open_selector(&mocha).unwrap();
    storefront.add_to_cart(&mocha, &selector, 1, None, now).unwrap();
}

#[test]
fn test_promotion_window_ends_after_last_day() {
    let storefront = Storefront::new(catalog());
    let bagel = ProductId::new("bagel");

    let last_second = storefront.price(&bagel, local(2026, 6, 15, 23, 59, 59)).unwrap();
    assert_eq!(last_second.price.amount_cents, 400);
    assert_eq!(last_second.promotion.map(|p| p.name.as_str()), Some("Breakfast deal"));

    let next_day = storefront.price(&bagel, local(2026, 6, 16, 0, 0, 0)).unwrap();
    assert_eq!(next_day.price.amount_cents, 500);
    assert!(next_day.promotion.is_none());
}

#[test]
fn test_radio_group_keeps_last_pick() {
    let storefront = Storefront::new(catalog());
    let mut selector = storefront.open_selector(&ProductId::new("latte")).unwrap();
    let milk = PersonalizationId::new("milk");

    selector.toggle(&milk, &OptionId::new("whole"));
    assert_eq!(selector.toggle(&milk, &OptionId::new("oat")), ToggleOutcome::Replaced);

    let picked: Vec<&str> = selector
        .selected_in(&milk)
        .iter()
        .map(|o| o.option_id.as_str())
        .collect();
    assert_eq!(picked, vec!["oat"]);
    assert_eq!(selector.extra_price().unwrap().amount_cents, 75);

    // Unavailable soy never changes the selection.
    assert!(matches!(
        selector.toggle(&milk, &OptionId::new("soy")),
        ToggleOutcome::Rejected(_)
    ));
    assert_eq!(selector.selected_in(&milk).len(), 1);
}

#[test]
fn test_multi_select_cap() {
    let storefront = Storefront::new(catalog());
    let mut selector = storefront.open_selector(&ProductId::new("bagel")).unwrap();
    let spread = PersonalizationId::new("spread");

    selector.toggle(&spread, &OptionId::new("butter"));
    selector.toggle(&spread, &OptionId::new("jam"));
    assert!(matches!(
        selector.toggle(&spread, &OptionId::new("cheese")),
        ToggleOutcome::Rejected(_)
    ));
    assert_eq!(selector.selected_in(&spread).len(), 2);

    assert_eq!(selector.toggle(&spread, &OptionId::new("butter")), ToggleOutcome::Deselected);
    assert_eq!(selector.toggle(&spread, &OptionId::new("cheese")), ToggleOutcome::Selected);
    assert_eq!(selector.extra_price().unwrap().amount_cents, 125);
}

#[tokio::test]
async fn test_delivery_order_end_to_end() {
    let kitchen = Kitchen::new(false);
    let outbox = Outbox::default();
    let mut storefront = Storefront::open(&kitchen).await.unwrap();
    fill_cart(&mut storefront, local(2026, 6, 15, 9, 0, 0));
    assert_eq!(storefront.cart().total().unwrap().amount_cents, 1150);

    let composer = OrderComposer::new(&kitchen, &outbox);
    let placed = storefront
        .place_order(&composer, &delivery_form(), Utc::now())
        .await
        .unwrap();

    assert_eq!(placed.order.total.amount_cents, 1450);
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert!(storefront.cart().is_empty());
    assert_eq!(storefront.flow().step, CheckoutStep::Confirmation);

    let messages = outbox.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Shipping: $2.00"));
    assert!(messages[0].contains("*Total: $14.50*"));
    drop(messages);

    // The admin board sees the order and can walk it through delivery.
    let mut board = OrderBoard::load(&kitchen).await.unwrap();
    assert_eq!(board.len(), 1);

    let admin = OrderAdmin::new(&kitchen);
    let mut order = board.get(&placed.order_id).unwrap().clone();
    for expected in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivering,
        OrderStatus::Completed,
    ] {
        order = admin.advance(&order).await.unwrap();
        assert_eq!(order.status, expected);
        board.apply(&ChangeEvent::OrderUpdated(order.clone()));
    }
    assert!(board.is_empty());
    assert!(admin.advance(&order).await.is_err());
}

#[tokio::test]
async fn test_failed_insert_keeps_cart_and_sends_nothing() {
    let kitchen = Kitchen::new(true);
    let outbox = Outbox::default();
    let mut storefront = Storefront::open(&kitchen).await.unwrap();
    fill_cart(&mut storefront, local(2026, 6, 15, 9, 0, 0));
    let before = storefront.cart().item_count();

    let composer = OrderComposer::new(&kitchen, &outbox);
    let result = storefront
        .place_order(&composer, &delivery_form(), Utc::now())
        .await;

    assert!(matches!(result, Err(CommerceError::Persistence(_))));
    assert_eq!(storefront.cart().item_count(), before);
    assert_ne!(storefront.flow().step, CheckoutStep::Confirmation);
    assert!(outbox.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_second_order_from_confirmation() {
    let kitchen = Kitchen::new(false);
    let outbox = Outbox::default();
    let mut storefront = Storefront::open(&kitchen).await.unwrap();
    let composer = OrderComposer::new(&kitchen, &outbox);
    let now = local(2026, 6, 15, 9, 0, 0);

    fill_cart(&mut storefront, now);
    let first = storefront
        .place_order(&composer, &delivery_form(), Utc::now())
        .await
        .unwrap();
    assert!(storefront.flow().is_confirmed());

    // Order again without leaving the confirmation screen.
    let mocha = ProductId::new("mocha");
    let selector = storefront.open_selector(&mocha).unwrap();
    storefront.add_to_cart(&mocha, &selector, 1, None, now).unwrap();
    let second = storefront
        .place_order(&composer, &delivery_form(), Utc::now())
        .await
        .unwrap();

    assert_ne!(first.order_id, second.order_id);
    assert_eq!(storefront.flow().placed_order.as_ref(), Some(&second.order_id));
    assert_eq!(kitchen.orders.lock().unwrap().len(), 2);
    assert_eq!(outbox.messages.lock().unwrap().len(), 2);
    assert!(storefront.cart().is_empty());

    // An empty cart is refused before anything is saved or sent.
    let third = storefront
        .place_order(&composer, &delivery_form(), Utc::now())
        .await;
    assert!(matches!(third, Err(CommerceError::Validation(_))));
    assert_eq!(kitchen.orders.lock().unwrap().len(), 2);
    assert_eq!(outbox.messages.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_cart_lines_survive_catalog_changes() {
    let kitchen = Kitchen::new(false);
    let mut storefront = Storefront::open(&kitchen).await.unwrap();

    let latte = ProductId::new("latte");
    let mut selector = storefront.open_selector(&latte).unwrap();
    selector.toggle(&PersonalizationId::new("milk"), &OptionId::new("oat"));
    let line = storefront
        .add_to_cart(&latte, &selector, 1, None, local(2026, 6, 15, 9, 0, 0))
        .unwrap();

    let mut changed = catalog();
    changed.products[1].price = usd(900);
    changed.personalization_groups[0].options[1].available = false;
    changed.fetched_at = storefront.snapshot().fetched_at + chrono::Duration::seconds(1);
    assert!(storefront.replace_snapshot(changed.into()));

    let item = storefront.cart().get(&line).unwrap();
    assert_eq!(item.unit_price.amount_cents, 425);
    assert_eq!(item.options.len(), 1);
    assert_eq!(item.options[0].name, "Oat");
}
