//! In-memory customer data
//!
//! Read-only store keyed by CPF. Seeded either with built-in sample data or
//! from a JSON file mapping CPF to customer record.

use crate::error::{AppError, AppResult};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// Customer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub nome: String,
    pub saldo: f64,
    #[serde(default)]
    pub contas: Vec<Account>,
}

/// Account record, with fields specific to its type
///
/// Serializes flat: `{"id": "001", "tipo": "corrente", "limite": 1000.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(flatten)]
    pub kind: AccountKind,
}

/// Type-specific part of an account, keyed by `tipo`
///
/// Known types are checked strictly. Any other `tipo` is kept as-is with its
/// remaining fields, so seed files can carry account types this API does not
/// interpret.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountKind {
    /// Checking account with an overdraft limit
    Corrente { limite: f64 },
    /// Savings account with a yield description
    Poupanca { rendimento: String },
    /// Any other account type, fields passed through untouched
    Outra {
        tipo: String,
        campos: Map<String, Value>,
    },
}

const TIPO_CORRENTE: &str = "corrente";
const TIPO_POUPANCA: &str = "poupança";

impl AccountKind {
    /// The `tipo` discriminator as it appears on the wire
    pub fn tipo(&self) -> &str {
        match self {
            AccountKind::Corrente { .. } => TIPO_CORRENTE,
            AccountKind::Poupanca { .. } => TIPO_POUPANCA,
            AccountKind::Outra { tipo, .. } => tipo,
        }
    }
}

impl Serialize for AccountKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("tipo", self.tipo())?;
        match self {
            AccountKind::Corrente { limite } => map.serialize_entry("limite", limite)?,
            AccountKind::Poupanca { rendimento } => {
                map.serialize_entry("rendimento", rendimento)?
            }
            AccountKind::Outra { campos, .. } => {
                for (key, value) in campos {
                    map.serialize_entry(key, value)?;
                }
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AccountKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(tag = "tipo")]
        enum KnownKind {
            #[serde(rename = "corrente")]
            Corrente { limite: f64 },
            #[serde(rename = "poupança")]
            Poupanca { rendimento: String },
        }

        let mut fields = Map::deserialize(deserializer)?;
        let tipo = match fields.get("tipo") {
            Some(Value::String(tipo)) => tipo.clone(),
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "tipo must be a string, got {}",
                    other
                )));
            }
            None => return Err(de::Error::missing_field("tipo")),
        };

        if tipo == TIPO_CORRENTE || tipo == TIPO_POUPANCA {
            let known = KnownKind::deserialize(Value::Object(fields)).map_err(de::Error::custom)?;
            return Ok(match known {
                KnownKind::Corrente { limite } => AccountKind::Corrente { limite },
                KnownKind::Poupanca { rendimento } => AccountKind::Poupanca { rendimento },
            });
        }

        fields.remove("tipo");
        Ok(AccountKind::Outra {
            tipo,
            campos: fields,
        })
    }
}

/// Immutable customer lookup table
#[derive(Debug, Clone, Default)]
pub struct CustomerStore {
    customers: HashMap<String, Customer>,
}

impl CustomerStore {
    pub fn new(customers: HashMap<String, Customer>) -> Self {
        Self { customers }
    }

    /// Store seeded with the built-in sample customer
    pub fn sample() -> Self {
        let mut customers = HashMap::new();
        customers.insert(
            "12345678900".to_string(),
            Customer {
                nome: "Maria Clara".to_string(),
                saldo: 2500.75,
                contas: vec![
                    Account {
                        id: "001".to_string(),
                        kind: AccountKind::Corrente { limite: 1000.0 },
                    },
                    Account {
                        id: "002".to_string(),
                        kind: AccountKind::Poupanca {
                            rendimento: "6% a.a".to_string(),
                        },
                    },
                ],
            },
        );
        Self { customers }
    }

    /// Load customers from a JSON object keyed by CPF
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| AppError::CustomerDataLoad {
                path: path_display.clone(),
                reason: e.to_string(),
            })?;

        let customers: HashMap<String, Customer> =
            serde_json::from_str(&content).map_err(|e| AppError::CustomerDataLoad {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(Self { customers })
    }

    /// Number of customers in the store
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Look up a customer by CPF
    pub fn get(&self, cpf: &str) -> Option<&Customer> {
        self.customers.get(cpf)
    }

    /// Look up a customer, failing with `CustomerNotFound`
    pub fn customer(&self, cpf: &str) -> AppResult<&Customer> {
        self.get(cpf).ok_or_else(|| AppError::CustomerNotFound {
            cpf: cpf.to_string(),
        })
    }

    /// Look up one of a customer's accounts by id
    pub fn account(&self, cpf: &str, account_id: &str) -> AppResult<&Account> {
        self.customer(cpf)?
            .contas
            .iter()
            .find(|account| account.id == account_id)
            .ok_or_else(|| AppError::AccountNotFound {
                cpf: cpf.to_string(),
                account_id: account_id.to_string(),
            })
    }
}
