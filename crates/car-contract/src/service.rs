//! # Car Contract Service
//!
//! Operation handlers of the marketplace contract.
//!
//! Each handler opens a `Transaction`, performs every read and validation,
//! stages its writes and commits them as one batch. A handler that fails
//! leaves the world state untouched.

use crate::adapters::InMemoryWorldState;
use crate::domain::entities::{Car, Malfunction, User};
use crate::domain::invariants::{
    balances_conserved, check_malfunction_price, effective_sale_price, is_write_off,
};
use crate::domain::seed::SeedSet;
use crate::domain::selector::{AssetQuery, CarFilter};
use crate::domain::value_objects::Amount;
use crate::errors::{ContractError, ContractResult, ValidationError};
use crate::ports::inbound::{CarContractApi, MalfunctionOutcome, RepairReceipt, SaleReceipt};
use crate::ports::outbound::WorldState;
use crate::transaction::Transaction;

use std::sync::Arc;
use tracing::{debug, field, info, instrument, warn, Span};

/// Default repair-service account.
pub const DEFAULT_MECHANIC_ID: &str = "user3";

/// Car contract configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractConfig {
    /// User that receives repair payments in `FixCar`.
    pub mechanic_id: String,
    /// Records written by `InitLedger`.
    pub seed: SeedSet,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            mechanic_id: DEFAULT_MECHANIC_ID.to_string(),
            seed: SeedSet::default(),
        }
    }
}

impl ContractConfig {
    /// Use another repair-service account.
    #[must_use]
    pub fn with_mechanic(mut self, mechanic_id: impl Into<String>) -> Self {
        self.mechanic_id = mechanic_id.into();
        self
    }
}

/// The car marketplace contract.
pub struct CarContract<S: WorldState> {
    /// World state adapter.
    state: Arc<S>,
    /// Contract configuration.
    config: ContractConfig,
}

impl<S: WorldState> CarContract<S> {
    /// Create a contract over `state`.
    pub fn new(state: Arc<S>, config: ContractConfig) -> Self {
        Self { state, config }
    }

    /// Contract configuration.
    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Shared handle to the world state.
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&self.state)
    }

    /// Open a transaction and tag the current handler span with its ID.
    fn begin(&self) -> Transaction<'_, S> {
        let tx = Transaction::begin(&*self.state);
        Span::current().record("tx_id", field::display(tx.id()));
        tx
    }

    fn run_query(&self, query: AssetQuery) -> ContractResult<Vec<Car>> {
        let query_string = query.to_query_string();
        debug!(query = %query_string, "Running asset query");
        self.begin().query::<Car>(&query_string)
    }
}

/// Create a contract over an empty in-memory world state (for testing).
#[must_use]
pub fn create_test_contract() -> CarContract<InMemoryWorldState> {
    CarContract::new(Arc::new(InMemoryWorldState::new()), ContractConfig::default())
}

// =============================================================================
// CarContractApi Implementation
// =============================================================================

impl<S: WorldState> CarContractApi for CarContract<S> {
    #[instrument(skip(self), fields(tx_id = field::Empty))]
    fn init_ledger(&self) -> ContractResult<()> {
        let mut tx = self.begin();
        for user in &self.config.seed.users {
            tx.put(user)?;
        }
        for car in &self.config.seed.cars {
            tx.put(car)?;
        }
        let written = tx.commit()?;
        info!(records = written, "Ledger seeded");
        Ok(())
    }

    #[instrument(skip(self), fields(tx_id = field::Empty))]
    fn read_car(&self, id: &str) -> ContractResult<Car> {
        let car: Car = self.begin().read(id)?;
        debug!(car_id = %id, malfunctions = car.malfunctions.len(), "Car read");
        Ok(car)
    }

    #[instrument(skip(self), fields(tx_id = field::Empty))]
    fn read_user(&self, id: &str) -> ContractResult<User> {
        let user: User = self.begin().read(id)?;
        debug!(user_id = %id, "User read");
        Ok(user)
    }

    #[instrument(skip(self), fields(tx_id = field::Empty))]
    fn change_color(&self, id: &str, color: &str) -> ContractResult<()> {
        let mut tx = self.begin();
        let mut car: Car = tx.read(id)?;
        car.color = color.to_string();
        tx.put(&car)?;
        tx.commit()?;
        info!(car_id = %id, color = %color, "Car repainted");
        Ok(())
    }

    #[instrument(skip(self, description), fields(tx_id = field::Empty))]
    fn add_malfunction(
        &self,
        id: &str,
        description: &str,
        price: Amount,
    ) -> ContractResult<MalfunctionOutcome> {
        let mut tx = self.begin();
        let mut car: Car = tx.read(id)?;
        check_malfunction_price(price)?;

        let total_cost = car
            .malfunction_cost()?
            .checked_add(price)
            .ok_or(ValidationError::AmountOverflow)?;

        if is_write_off(car.price, total_cost) {
            warn!(
                car_id = %id,
                total_cost = %total_cost,
                car_price = %car.price,
                "Repair cost exceeds car value, writing car off"
            );
            tx.delete(id)?;
            tx.commit()?;
            return Ok(MalfunctionOutcome::WrittenOff {
                car_id: id.to_string(),
            });
        }

        car.malfunctions.push(Malfunction::new(description, price));
        tx.put(&car)?;
        tx.commit()?;
        info!(car_id = %id, total_cost = %total_cost, "Malfunction recorded");
        Ok(MalfunctionOutcome::Recorded { total_cost })
    }

    #[instrument(skip(self), fields(tx_id = field::Empty))]
    fn delete_asset(&self, id: &str) -> ContractResult<()> {
        let mut tx = self.begin();
        tx.delete(id)?;
        tx.commit()?;
        info!(asset_id = %id, "Asset deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(tx_id = field::Empty))]
    fn asset_exists(&self, id: &str) -> ContractResult<bool> {
        let exists = self.begin().exists(id)?;
        debug!(asset_id = %id, exists, "Asset lookup");
        Ok(exists)
    }

    #[instrument(skip(self), fields(tx_id = field::Empty))]
    fn buy_car(
        &self,
        id: &str,
        new_owner_id: &str,
        acknowledge_malfunctions: bool,
    ) -> ContractResult<SaleReceipt> {
        let mut tx = self.begin();
        let mut car: Car = tx.read(id)?;
        let mut seller: User = tx.read(&car.owner)?;
        let mut buyer: User = tx.read(new_owner_id)?;

        if seller.id == buyer.id {
            return Err(ValidationError::AlreadyOwner {
                car_id: car.id,
                owner: seller.id,
            }
            .into());
        }

        let price = match effective_sale_price(&car, acknowledge_malfunctions) {
            Ok(price) => price,
            Err(e) => {
                warn!(car_id = %id, buyer = %new_owner_id, error = %e, "Sale rejected");
                return Err(e);
            }
        };

        if buyer.balance < price {
            warn!(buyer = %new_owner_id, price = %price, "Buyer cannot afford car");
            return Err(ContractError::InsufficientFunds {
                user_id: buyer.id,
                required: price,
                available: buyer.balance,
            });
        }

        let before = [seller.balance, buyer.balance];
        buyer.debit(price)?;
        seller.credit(price)?;
        debug_assert!(balances_conserved(&before, &[seller.balance, buyer.balance]));
        car.owner = buyer.id.clone();

        tx.put(&seller)?;
        tx.put(&buyer)?;
        tx.put(&car)?;
        tx.commit()?;

        info!(car_id = %id, seller = %seller.id, buyer = %buyer.id, price = %price, "Car sold");
        Ok(SaleReceipt {
            car_id: car.id,
            seller: seller.id,
            buyer: buyer.id,
            price,
        })
    }

    #[instrument(skip(self), fields(tx_id = field::Empty))]
    fn fix_car(&self, id: &str) -> ContractResult<RepairReceipt> {
        let mut tx = self.begin();
        let mut car: Car = tx.read(id)?;
        let mut owner: User = tx.read(&car.owner)?;
        let mut mechanic: User = tx.read(&self.config.mechanic_id)?;

        let cost = car.malfunction_cost()?;
        if owner.balance < cost {
            warn!(owner = %owner.id, cost = %cost, "Owner cannot afford repair");
            return Err(ContractError::InsufficientFunds {
                user_id: owner.id,
                required: cost,
                available: owner.balance,
            });
        }

        car.malfunctions.clear();

        if owner.id == mechanic.id {
            // Paying oneself: balance unchanged.
            tx.put(&owner)?;
        } else {
            let before = [owner.balance, mechanic.balance];
            owner.debit(cost)?;
            mechanic.credit(cost)?;
            debug_assert!(balances_conserved(&before, &[owner.balance, mechanic.balance]));
            tx.put(&owner)?;
            tx.put(&mechanic)?;
        }
        tx.put(&car)?;
        tx.commit()?;

        info!(car_id = %id, owner = %owner.id, mechanic = %mechanic.id, cost = %cost, "Car repaired");
        Ok(RepairReceipt {
            car_id: car.id,
            owner: owner.id,
            mechanic: mechanic.id,
            cost,
        })
    }

    #[instrument(skip(self), fields(tx_id = field::Empty))]
    fn query_assets_by_color(&self, color: &str) -> ContractResult<Vec<Car>> {
        self.run_query(CarFilter::by_color(color).into())
    }

    #[instrument(skip(self), fields(tx_id = field::Empty))]
    fn query_assets_by_owner(&self, owner: &str) -> ContractResult<Vec<Car>> {
        self.run_query(CarFilter::by_owner(owner).into())
    }

    #[instrument(skip(self), fields(tx_id = field::Empty))]
    fn query_assets_by_color_and_owner(
        &self,
        color: &str,
        owner: &str,
    ) -> ContractResult<Vec<Car>> {
        self.run_query(CarFilter::by_color_and_owner(color, owner).into())
    }

    #[instrument(skip(self), fields(tx_id = field::Empty))]
    fn query_assets(&self, query: &str) -> ContractResult<Vec<Car>> {
        self.run_query(AssetQuery::Raw(query.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::DocType;
    use crate::errors::StateError;
    use rust_decimal_macros::dec;
    use parking_lot::Mutex;
    use tracing::span::{Id, Record};
    use tracing::Subscriber;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;
    use tracing_subscriber::Layer;
    use uuid::Uuid;

    fn seeded() -> CarContract<InMemoryWorldState> {
        let contract = create_test_contract();
        contract.init_ledger().unwrap();
        contract
    }

    fn balance(contract: &CarContract<InMemoryWorldState>, id: &str) -> Amount {
        contract.read_user(id).unwrap().balance
    }

    // =========================================================================
    // SEEDING & READS
    // =========================================================================

    #[test]
    fn test_init_ledger_writes_seed() {
        let contract = seeded();
        assert_eq!(contract.state().len(), 9);
        assert_eq!(contract.read_car("car2").unwrap().brand, "Rolls Royce");
        assert_eq!(balance(&contract, "user2"), Amount::from_units(3500));
    }

    #[test]
    fn test_init_ledger_overwrites_mutations() {
        let contract = seeded();
        contract.change_color("car1", "Green").unwrap();
        contract.init_ledger().unwrap();
        assert_eq!(contract.read_car("car1").unwrap().color, "Red");
    }

    #[test]
    fn test_init_ledger_failure_writes_nothing() {
        let contract = create_test_contract();
        contract
            .state()
            .fail_next_batch(StateError::Io("disk full".into()));
        assert!(contract.init_ledger().is_err());
        assert!(contract.state().is_empty());
    }

    #[test]
    fn test_read_missing() {
        let contract = seeded();
        assert_eq!(
            contract.read_car("car9"),
            Err(ContractError::NotFound {
                kind: DocType::Car,
                id: "car9".into()
            })
        );
        assert!(matches!(
            contract.read_user("user9"),
            Err(ContractError::NotFound { kind: DocType::User, .. })
        ));
    }

    #[test]
    fn test_read_user_as_car_is_decode_error() {
        let contract = seeded();
        let err = contract.read_car("user1").unwrap_err();
        assert_eq!(err.category(), "DecodeError");
    }

    // =========================================================================
    // CHANGE COLOR / DELETE / EXISTS
    // =========================================================================

    #[test]
    fn test_change_color_only_touches_color() {
        let contract = seeded();
        let before = contract.read_car("car3").unwrap();
        contract.change_color("car3", "Gulf Blue").unwrap();
        let after = contract.read_car("car3").unwrap();
        assert_eq!(after.color, "Gulf Blue");
        assert_eq!(Car { color: before.color.clone(), ..after }, before);
    }

    #[test]
    fn test_change_color_missing_car() {
        let contract = seeded();
        assert!(matches!(
            contract.change_color("car9", "Red"),
            Err(ContractError::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_and_exists() {
        let contract = seeded();
        assert!(contract.asset_exists("car4").unwrap());
        contract.delete_asset("car4").unwrap();
        assert!(!contract.asset_exists("car4").unwrap());
        assert_eq!(
            contract.delete_asset("car4"),
            Err(ContractError::AssetNotFound("car4".into()))
        );
    }

    // =========================================================================
    // MALFUNCTIONS
    // =========================================================================

    #[test]
    fn test_add_malfunction_records_in_order() {
        let contract = seeded();
        contract
            .add_malfunction("car2", "Scratches", Amount::from_units(100))
            .unwrap();
        let outcome = contract
            .add_malfunction("car2", "Gearbox", Amount::new(dec!(1200.5)))
            .unwrap();
        assert_eq!(
            outcome,
            MalfunctionOutcome::Recorded {
                total_cost: Amount::new(dec!(1300.5))
            }
        );

        let car = contract.read_car("car2").unwrap();
        let descriptions: Vec<_> = car.malfunctions.iter().map(|m| m.description.as_str()).collect();
        assert_eq!(descriptions, ["Scratches", "Gearbox"]);
    }

    #[test]
    fn test_add_malfunction_keeps_full_precision() {
        let contract = seeded();
        let price = Amount::new(dec!(0.1234567890123456789));
        let outcome = contract.add_malfunction("car1", "Chip", price).unwrap();
        assert_eq!(outcome, MalfunctionOutcome::Recorded { total_cost: price });

        let car = contract.read_car("car1").unwrap();
        assert_eq!(car.malfunctions[0].price, price);
        assert_eq!(car.malfunction_cost().unwrap(), price);
    }

    #[test]
    fn test_add_malfunction_non_positive_price() {
        let contract = seeded();
        let before = contract.state().snapshot();
        for price in [Amount::ZERO, Amount::from_units(-50)] {
            let err = contract.add_malfunction("car1", "Free fix", price).unwrap_err();
            assert!(matches!(
                err,
                ContractError::Validation(ValidationError::NonPositivePrice { .. })
            ));
        }
        assert_eq!(contract.state().snapshot(), before);
    }

    #[test]
    fn test_add_malfunction_missing_car_checked_before_price() {
        let contract = seeded();
        assert!(matches!(
            contract.add_malfunction("car9", "x", Amount::ZERO),
            Err(ContractError::NotFound { .. })
        ));
    }

    #[test]
    fn test_add_malfunction_at_price_is_not_write_off() {
        let contract = seeded();
        let outcome = contract
            .add_malfunction("car1", "Engine", Amount::from_units(5000))
            .unwrap();
        assert!(matches!(outcome, MalfunctionOutcome::Recorded { .. }));
        assert!(contract.asset_exists("car1").unwrap());
    }

    #[test]
    fn test_add_malfunction_write_off() {
        let contract = seeded();
        contract
            .add_malfunction("car3", "Rust", Amount::from_units(4000))
            .unwrap();
        let outcome = contract
            .add_malfunction("car3", "Frame", Amount::from_units(3001))
            .unwrap();
        assert_eq!(
            outcome,
            MalfunctionOutcome::WrittenOff {
                car_id: "car3".into()
            }
        );
        assert!(!contract.asset_exists("car3").unwrap());
    }

    // =========================================================================
    // BUY CAR
    // =========================================================================

    #[test]
    fn test_buy_car_clean() {
        let contract = seeded();
        let receipt = contract.buy_car("car5", "user1", false).unwrap();
        assert_eq!(receipt.price, Amount::from_units(9000));
        assert_eq!(receipt.seller, "user2");
        assert_eq!(balance(&contract, "user1"), Amount::ZERO);
        assert_eq!(balance(&contract, "user2"), Amount::from_units(12500));
        assert_eq!(contract.read_car("car5").unwrap().owner, "user1");
    }

    #[test]
    fn test_buy_car_with_malfunctions() {
        let contract = seeded();
        contract
            .add_malfunction("car5", "Battery", Amount::from_units(1000))
            .unwrap();
        assert!(matches!(
            contract.buy_car("car5", "user1", false),
            Err(ContractError::Validation(ValidationError::PurchaseCancelled { .. }))
        ));
        assert_eq!(contract.read_car("car5").unwrap().owner, "user2");

        let receipt = contract.buy_car("car5", "user1", true).unwrap();
        assert_eq!(receipt.price, Amount::from_units(8000));
        assert_eq!(balance(&contract, "user1"), Amount::from_units(1000));
        assert_eq!(balance(&contract, "user2"), Amount::from_units(11500));
        assert_eq!(contract.read_car("car5").unwrap().malfunctions.len(), 1);
    }

    #[test]
    fn test_buy_car_insufficient_funds() {
        let contract = seeded();
        let before = contract.state().snapshot();
        let err = contract.buy_car("car2", "user2", true).unwrap_err();
        assert_eq!(
            err,
            ContractError::InsufficientFunds {
                user_id: "user2".into(),
                required: Amount::from_units(20000),
                available: Amount::from_units(3500),
            }
        );
        assert_eq!(contract.state().snapshot(), before);
    }

    #[test]
    fn test_buy_car_rejects_current_owner() {
        let contract = seeded();
        assert!(matches!(
            contract.buy_car("car1", "user1", true),
            Err(ContractError::Validation(ValidationError::AlreadyOwner { .. }))
        ));
    }

    #[test]
    fn test_buy_car_missing_parties() {
        let contract = seeded();
        assert!(matches!(
            contract.buy_car("car9", "user1", true),
            Err(ContractError::NotFound { kind: DocType::Car, .. })
        ));
        assert!(matches!(
            contract.buy_car("car1", "user9", true),
            Err(ContractError::NotFound { kind: DocType::User, .. })
        ));
    }

    #[test]
    fn test_buy_car_persistence_failure_applies_nothing() {
        let contract = seeded();
        let before = contract.state().snapshot();
        contract
            .state()
            .fail_next_batch(StateError::Io("disk full".into()));
        assert!(matches!(
            contract.buy_car("car5", "user1", true),
            Err(ContractError::Persistence(_))
        ));
        assert_eq!(contract.state().snapshot(), before);
    }

    // =========================================================================
    // FIX CAR
    // =========================================================================

    #[test]
    fn test_fix_car_pays_mechanic() {
        let contract = seeded();
        contract
            .add_malfunction("car4", "Clutch", Amount::from_units(700))
            .unwrap();
        let receipt = contract.fix_car("car4").unwrap();
        assert_eq!(receipt.cost, Amount::from_units(700));
        assert_eq!(receipt.mechanic, "user3");
        assert!(contract.read_car("car4").unwrap().malfunctions.is_empty());
        assert_eq!(balance(&contract, "user2"), Amount::from_units(2800));
        assert_eq!(balance(&contract, "user3"), Amount::from_units(4700));
    }

    #[test]
    fn test_fix_car_settles_exact_amounts() {
        let contract = seeded();
        contract
            .add_malfunction("car4", "Injectors", Amount::new(dec!(1234.567890123456789)))
            .unwrap();
        contract.fix_car("car4").unwrap();
        assert_eq!(balance(&contract, "user2"), Amount::new(dec!(2265.432109876543211)));
        assert_eq!(balance(&contract, "user3"), Amount::new(dec!(5234.567890123456789)));
    }

    #[test]
    fn test_fix_car_insufficient_funds() {
        let contract = seeded();
        contract
            .add_malfunction("car6", "Engine", Amount::from_units(4000))
            .unwrap();
        let err = contract.fix_car("car6").unwrap_err();
        assert_eq!(err.category(), "InsufficientFunds");
        assert_eq!(contract.read_car("car6").unwrap().malfunctions.len(), 1);
    }

    #[test]
    fn test_fix_car_configured_mechanic() {
        let state = Arc::new(InMemoryWorldState::new());
        let contract = CarContract::new(state, ContractConfig::default().with_mechanic("user1"));
        contract.init_ledger().unwrap();
        contract
            .add_malfunction("car5", "Battery", Amount::from_units(500))
            .unwrap();
        contract.fix_car("car5").unwrap();
        assert_eq!(balance(&contract, "user1"), Amount::from_units(9500));
        assert_eq!(balance(&contract, "user3"), Amount::from_units(4000));
    }

    #[test]
    fn test_fix_car_owner_is_mechanic() {
        let state = Arc::new(InMemoryWorldState::new());
        let contract = CarContract::new(state, ContractConfig::default().with_mechanic("user1"));
        contract.init_ledger().unwrap();
        contract
            .add_malfunction("car1", "Paint", Amount::from_units(300))
            .unwrap();
        let receipt = contract.fix_car("car1").unwrap();
        assert_eq!(receipt.owner, receipt.mechanic);
        assert_eq!(balance(&contract, "user1"), Amount::from_units(9000));
        assert!(contract.read_car("car1").unwrap().malfunctions.is_empty());
    }

    #[test]
    fn test_fix_car_missing_mechanic() {
        let state = Arc::new(InMemoryWorldState::new());
        let contract = CarContract::new(state, ContractConfig::default().with_mechanic("garage"));
        contract.init_ledger().unwrap();
        assert!(matches!(
            contract.fix_car("car1"),
            Err(ContractError::NotFound { ref id, .. }) if id == "garage"
        ));
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[test]
    fn test_query_by_color_and_owner() {
        let contract = seeded();
        let black = contract.query_assets_by_color("Black").unwrap();
        let ids: Vec<_> = black.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["car2", "car4"]);

        let owned = contract.query_assets_by_owner("user2").unwrap();
        assert_eq!(owned.len(), 3);

        let both = contract
            .query_assets_by_color_and_owner("Black", "user1")
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].id, "car2");

        assert!(contract.query_assets_by_color("Purple").unwrap().is_empty());
        assert_eq!(contract.state().open_cursors(), 0);
    }

    #[test]
    fn test_raw_query_matching_users_fails() {
        let contract = seeded();
        let err = contract
            .query_assets(r#"{"selector":{"docType":"user"}}"#)
            .unwrap_err();
        assert_eq!(err.category(), "DecodeError");
        assert_eq!(contract.state().open_cursors(), 0);
    }

    #[test]
    fn test_raw_query_over_cars() {
        let contract = seeded();
        let cars = contract
            .query_assets(r#"{"selector":{"brand":"Ford"}}"#)
            .unwrap();
        assert_eq!(cars.len(), 2);
    }

    #[test]
    fn test_raw_query_invalid() {
        let contract = seeded();
        assert!(matches!(
            contract.query_assets("garbage"),
            Err(ContractError::Persistence(StateError::InvalidQuery(_)))
        ));
    }

    // =========================================================================
    // TRACING
    // =========================================================================

    /// Collects `(span name, tx_id)` pairs as handlers record them.
    #[derive(Clone, Default)]
    struct TxIdLayer {
        seen: Arc<Mutex<Vec<(String, String)>>>,
    }

    struct TxIdVisitor(Option<String>);

    impl field::Visit for TxIdVisitor {
        fn record_debug(&mut self, field: &field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "tx_id" {
                self.0 = Some(format!("{value:?}"));
            }
        }
    }

    impl<T> Layer<T> for TxIdLayer
    where
        T: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, T>) {
            let mut visitor = TxIdVisitor(None);
            values.record(&mut visitor);
            if let (Some(tx_id), Some(span)) = (visitor.0, ctx.span(id)) {
                self.seen.lock().push((span.name().to_string(), tx_id));
            }
        }
    }

    #[test]
    fn test_handler_spans_carry_tx_id() {
        let layer = TxIdLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());

        tracing::subscriber::with_default(subscriber, || {
            let contract = seeded();
            contract.read_car("car1").unwrap();
            contract.buy_car("car5", "user1", false).unwrap();
            contract.query_assets_by_color("Red").unwrap();
        });

        let seen = layer.seen.lock().clone();
        let names: Vec<_> = seen.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            ["init_ledger", "read_car", "buy_car", "query_assets_by_color"]
        );

        let ids: Vec<Uuid> = seen.iter().map(|(_, id)| id.parse().unwrap()).collect();
        for (i, id) in ids.iter().enumerate() {
            assert!(!ids[i + 1..].contains(id));
        }
    }
}
