//! # Invocation Dispatch
//!
//! Routes a named function with positional text arguments to the matching
//! handler and encodes its result as JSON.
//!
//! ## Function Table
//!
//! | Function | Arguments |
//! |----------|-----------|
//! | `InitLedger` | none |
//! | `ReadCar` | id |
//! | `ReadUser` | id |
//! | `ChangeColor` | id, color |
//! | `AddMalfunction` | id, description, price |
//! | `DeleteAsset` | id |
//! | `AssetExists` | id |
//! | `BuyCar` | id, newOwnerId, acknowledgeMalfunctions |
//! | `FixCar` | id |
//! | `QueryAssetsByColor` | color |
//! | `QueryAssetsByOwner` | owner |
//! | `QueryAssetsByColorAndOwner` | color, owner |
//! | `QueryAssets` | query string |

use crate::domain::value_objects::Amount;
use crate::errors::{ContractError, ContractResult};
use crate::ports::inbound::CarContractApi;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, instrument, warn};

/// A parsed invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Operation {
    /// Write the seed set.
    InitLedger,
    ReadCar { id: String },
    ReadUser { id: String },
    ChangeColor { id: String, color: String },
    AddMalfunction {
        id: String,
        description: String,
        price: Amount,
    },
    DeleteAsset { id: String },
    AssetExists { id: String },
    BuyCar {
        id: String,
        new_owner_id: String,
        acknowledge_malfunctions: bool,
    },
    /// Pay the mechanic and clear malfunctions.
    FixCar { id: String },
    QueryAssetsByColor { color: String },
    QueryAssetsByOwner { owner: String },
    QueryAssetsByColorAndOwner { color: String, owner: String },
    /// Raw selector pass-through.
    QueryAssets { query: String },
}

impl Operation {
    /// Every function name accepted by [`Operation::parse`].
    pub const FUNCTIONS: [&'static str; 13] = [
        "InitLedger",
        "ReadCar",
        "ReadUser",
        "ChangeColor",
        "AddMalfunction",
        "DeleteAsset",
        "AssetExists",
        "BuyCar",
        "FixCar",
        "QueryAssetsByColor",
        "QueryAssetsByOwner",
        "QueryAssetsByColorAndOwner",
        "QueryAssets",
    ];

    /// Parse a function name and its text arguments.
    pub fn parse(function: &str, args: &[String]) -> ContractResult<Self> {
        let op = match function {
            "InitLedger" => {
                arity("InitLedger", args, 0)?;
                Self::InitLedger
            }
            "ReadCar" => Self::ReadCar {
                id: single("ReadCar", args)?,
            },
            "ReadUser" => Self::ReadUser {
                id: single("ReadUser", args)?,
            },
            "ChangeColor" => {
                let [id, color] = exact::<2>("ChangeColor", args)?;
                Self::ChangeColor { id, color }
            }
            "AddMalfunction" => {
                let [id, description, price] = exact::<3>("AddMalfunction", args)?;
                Self::AddMalfunction {
                    id,
                    description,
                    price: parse_amount("price", &price)?,
                }
            }
            "DeleteAsset" => Self::DeleteAsset {
                id: single("DeleteAsset", args)?,
            },
            "AssetExists" => Self::AssetExists {
                id: single("AssetExists", args)?,
            },
            "BuyCar" => {
                let [id, new_owner_id, acknowledge] = exact::<3>("BuyCar", args)?;
                Self::BuyCar {
                    id,
                    new_owner_id,
                    acknowledge_malfunctions: parse_bool("acknowledgeMalfunctions", &acknowledge)?,
                }
            }
            "FixCar" => Self::FixCar {
                id: single("FixCar", args)?,
            },
            "QueryAssetsByColor" => Self::QueryAssetsByColor {
                color: single("QueryAssetsByColor", args)?,
            },
            "QueryAssetsByOwner" => Self::QueryAssetsByOwner {
                owner: single("QueryAssetsByOwner", args)?,
            },
            "QueryAssetsByColorAndOwner" => {
                let [color, owner] = exact::<2>("QueryAssetsByColorAndOwner", args)?;
                Self::QueryAssetsByColorAndOwner { color, owner }
            }
            "QueryAssets" => Self::QueryAssets {
                query: single("QueryAssets", args)?,
            },
            other => {
                warn!(function = %other, "Unknown function");
                return Err(ContractError::UnknownFunction(other.to_string()));
            }
        };
        Ok(op)
    }

    /// Function name of this operation.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitLedger => "InitLedger",
            Self::ReadCar { .. } => "ReadCar",
            Self::ReadUser { .. } => "ReadUser",
            Self::ChangeColor { .. } => "ChangeColor",
            Self::AddMalfunction { .. } => "AddMalfunction",
            Self::DeleteAsset { .. } => "DeleteAsset",
            Self::AssetExists { .. } => "AssetExists",
            Self::BuyCar { .. } => "BuyCar",
            Self::FixCar { .. } => "FixCar",
            Self::QueryAssetsByColor { .. } => "QueryAssetsByColor",
            Self::QueryAssetsByOwner { .. } => "QueryAssetsByOwner",
            Self::QueryAssetsByColorAndOwner { .. } => "QueryAssetsByColorAndOwner",
            Self::QueryAssets { .. } => "QueryAssets",
        }
    }

    /// True if the operation never writes.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Self::ReadCar { .. }
                | Self::ReadUser { .. }
                | Self::AssetExists { .. }
                | Self::QueryAssetsByColor { .. }
                | Self::QueryAssetsByOwner { .. }
                | Self::QueryAssetsByColorAndOwner { .. }
                | Self::QueryAssets { .. }
        )
    }
}

// =============================================================================
// EXECUTION
// =============================================================================

/// Run a parsed operation and encode its result.
///
/// Unit results encode as `null`.
#[instrument(skip(api, op), fields(function = op.name()))]
pub fn execute(api: &dyn CarContractApi, op: Operation) -> ContractResult<Value> {
    match op {
        Operation::InitLedger => api.init_ledger().map(|()| Value::Null),
        Operation::ReadCar { id } => to_json("result", &api.read_car(&id)?),
        Operation::ReadUser { id } => to_json("result", &api.read_user(&id)?),
        Operation::ChangeColor { id, color } => api.change_color(&id, &color).map(|()| Value::Null),
        Operation::AddMalfunction {
            id,
            description,
            price,
        } => to_json("result", &api.add_malfunction(&id, &description, price)?),
        Operation::DeleteAsset { id } => api.delete_asset(&id).map(|()| Value::Null),
        Operation::AssetExists { id } => api.asset_exists(&id).map(Value::Bool),
        Operation::BuyCar {
            id,
            new_owner_id,
            acknowledge_malfunctions,
        } => to_json(
            "result",
            &api.buy_car(&id, &new_owner_id, acknowledge_malfunctions)?,
        ),
        Operation::FixCar { id } => to_json("result", &api.fix_car(&id)?),
        Operation::QueryAssetsByColor { color } => {
            to_json("result", &api.query_assets_by_color(&color)?)
        }
        Operation::QueryAssetsByOwner { owner } => {
            to_json("result", &api.query_assets_by_owner(&owner)?)
        }
        Operation::QueryAssetsByColorAndOwner { color, owner } => {
            to_json("result", &api.query_assets_by_color_and_owner(&color, &owner)?)
        }
        Operation::QueryAssets { query } => to_json("result", &api.query_assets(&query)?),
    }
}

/// Parse and run `function` with `args`.
pub fn invoke(api: &dyn CarContractApi, function: &str, args: &[String]) -> ContractResult<Value> {
    let op = Operation::parse(function, args)?;
    debug!(function = op.name(), read_only = op.is_read_only(), "Dispatching");
    execute(api, op)
}

// =============================================================================
// ARGUMENT PARSING
// =============================================================================

fn arity(function: &'static str, args: &[String], expected: usize) -> ContractResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ContractError::ArgumentCount {
            function,
            expected,
            actual: args.len(),
        })
    }
}

fn exact<const N: usize>(function: &'static str, args: &[String]) -> ContractResult<[String; N]> {
    arity(function, args, N)?;
    Ok(std::array::from_fn(|i| args[i].clone()))
}

fn single(function: &'static str, args: &[String]) -> ContractResult<String> {
    let [value] = exact::<1>(function, args)?;
    Ok(value)
}

fn parse_amount(name: &'static str, value: &str) -> ContractResult<Amount> {
    Amount::from_str(value).map_err(|e| ContractError::InvalidArgument {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Boolean with the `1 t T TRUE true True` / `0 f F FALSE false False` vocabulary.
fn parse_bool(name: &'static str, value: &str) -> ContractResult<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ContractError::InvalidArgument {
            name,
            value: value.to_string(),
            reason: "invalid boolean".to_string(),
        }),
    }
}

fn to_json<T: Serialize>(key: &str, value: &T) -> ContractResult<Value> {
    serde_json::to_value(value).map_err(|e| ContractError::Encode {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::create_test_contract;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    fn amount(value: &Value) -> Amount {
        serde_json::from_value(value.clone()).unwrap()
    }

    // =========================================================================
    // PARSING
    // =========================================================================

    #[test]
    fn test_parse_every_function_name() {
        for function in Operation::FUNCTIONS {
            let err = Operation::parse(function, &args(&["a", "b", "c", "d"])).unwrap_err();
            assert!(matches!(err, ContractError::ArgumentCount { .. }), "{function}");
        }
    }

    #[test]
    fn test_parse_add_malfunction() {
        let op = Operation::parse("AddMalfunction", &args(&["car1", "Flat tires", "850.50"])).unwrap();
        assert_eq!(
            op,
            Operation::AddMalfunction {
                id: "car1".into(),
                description: "Flat tires".into(),
                price: Amount::new(dec!(850.50)),
            }
        );
        assert!(!op.is_read_only());
    }

    #[test]
    fn test_parse_bad_amount() {
        let err = Operation::parse("AddMalfunction", &args(&["car1", "x", "cheap"])).unwrap_err();
        assert!(matches!(err, ContractError::InvalidArgument { name: "price", .. }));
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_parse_bool_vocabulary() {
        for text in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool("b", text), Ok(true), "{text}");
        }
        for text in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool("b", text), Ok(false), "{text}");
        }
        for text in ["yes", "tRUE", "", " true"] {
            assert!(parse_bool("b", text).is_err(), "{text:?}");
        }
    }

    #[test]
    fn test_parse_unknown_and_arity() {
        assert_eq!(
            Operation::parse("MintCar", &[]),
            Err(ContractError::UnknownFunction("MintCar".into()))
        );
        assert_eq!(
            Operation::parse("ReadCar", &[]),
            Err(ContractError::ArgumentCount {
                function: "ReadCar",
                expected: 1,
                actual: 0
            })
        );
    }

    // =========================================================================
    // EXECUTION
    // =========================================================================

    #[test]
    fn test_invoke_round_trip() {
        let contract = create_test_contract();
        assert_eq!(invoke(&contract, "InitLedger", &[]).unwrap(), Value::Null);

        let car = invoke(&contract, "ReadCar", &args(&["car1"])).unwrap();
        assert_eq!(car["ID"], json!("car1"));
        assert_eq!(car["docType"], json!("car"));
        assert_eq!(amount(&car["price"]), Amount::from_units(5000));
        assert_eq!(car["malfunctions"], json!([]));

        let user = invoke(&contract, "ReadUser", &args(&["user2"])).unwrap();
        assert_eq!(user["firstName"], json!("Petar"));

        assert_eq!(
            invoke(&contract, "AssetExists", &args(&["car9"])).unwrap(),
            json!(false)
        );
    }

    #[test]
    fn test_invoke_outcomes_are_tagged() {
        let contract = create_test_contract();
        invoke(&contract, "InitLedger", &[]).unwrap();

        let recorded = invoke(&contract, "AddMalfunction", &args(&["car1", "Flat tires", "850"])).unwrap();
        assert_eq!(recorded["outcome"], json!("recorded"));
        assert_eq!(amount(&recorded["totalCost"]), Amount::from_units(850));

        let written_off =
            invoke(&contract, "AddMalfunction", &args(&["car6", "Engine issues", "11000"])).unwrap();
        assert_eq!(written_off, json!({"outcome": "writtenOff", "carId": "car6"}));
    }

    #[test]
    fn test_invoke_buy_car_receipt() {
        let contract = create_test_contract();
        invoke(&contract, "InitLedger", &[]).unwrap();
        let receipt = invoke(&contract, "BuyCar", &args(&["car5", "user1", "F"])).unwrap();
        assert_eq!(receipt["carId"], json!("car5"));
        assert_eq!(receipt["seller"], json!("user2"));
        assert_eq!(receipt["buyer"], json!("user1"));
        assert_eq!(amount(&receipt["price"]), Amount::from_units(9000));
    }

    #[test]
    fn test_invoke_query_returns_array() {
        let contract = create_test_contract();
        invoke(&contract, "InitLedger", &[]).unwrap();
        let cars = invoke(&contract, "QueryAssetsByColorAndOwner", &args(&["Black", "user2"])).unwrap();
        let cars = cars.as_array().unwrap();
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0]["ID"], json!("car4"));
    }

    #[test]
    fn test_invoke_propagates_handler_error() {
        let contract = create_test_contract();
        let err = invoke(&contract, "ReadCar", &args(&["car1"])).unwrap_err();
        assert_eq!(err.category(), "NotFound");
    }
}
