use std::{fmt, str::FromStr};

use serde_json::{Map, Value};

use crate::errors::ServiceError;

/// Shape of a collection's default value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    List,
    Map,
}

impl Shape {
    pub fn empty(self) -> Value {
        match self {
            Shape::List => Value::Array(Vec::new()),
            Shape::Map => Value::Object(Map::new()),
        }
    }
}

/// The closed registry of collections the frontend may read and write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Users,
    Applications,
    PurchaseRequests,
    TaskSubmissions,
    RewardHistory,
    Leaderboard,
    CellTasks,
    GameStates,
    ShopItems,
    ShoppingCarts,
}

impl DataType {
    pub const ALL: [DataType; 10] = [
        DataType::Users,
        DataType::Applications,
        DataType::PurchaseRequests,
        DataType::TaskSubmissions,
        DataType::RewardHistory,
        DataType::Leaderboard,
        DataType::CellTasks,
        DataType::GameStates,
        DataType::ShopItems,
        DataType::ShoppingCarts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Users => "users",
            DataType::Applications => "applications",
            DataType::PurchaseRequests => "purchase_requests",
            DataType::TaskSubmissions => "task_submissions",
            DataType::RewardHistory => "reward_history",
            DataType::Leaderboard => "leaderboard",
            DataType::CellTasks => "cell_tasks",
            DataType::GameStates => "game_states",
            DataType::ShopItems => "shop_items",
            DataType::ShoppingCarts => "shopping_carts",
        }
    }

    /// Backing file name inside the data directory.
    pub fn file_name(self) -> String {
        format!("{}.json", self.as_str())
    }

    pub fn shape(self) -> Shape {
        match self {
            DataType::GameStates | DataType::ShoppingCarts => Shape::Map,
            _ => Shape::List,
        }
    }

    pub fn default_value(self) -> Value {
        self.shape().empty()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|dt| dt.as_str() == s)
            .ok_or_else(|| ServiceError::UnknownDataType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registry_names_round_trip() {
        for dt in DataType::ALL {
            assert_eq!(dt.as_str().parse::<DataType>().ok(), Some(dt));
            assert_eq!(dt.file_name(), format!("{dt}.json"));
        }
    }

    #[test]
    fn only_carts_and_game_states_are_maps() {
        let maps: Vec<_> = DataType::ALL.into_iter().filter(|d| d.shape() == Shape::Map).collect();
        assert_eq!(maps, vec![DataType::GameStates, DataType::ShoppingCarts]);
        assert_eq!(DataType::Leaderboard.default_value(), json!([]));
        assert_eq!(DataType::ShoppingCarts.default_value(), json!({}));
    }

    #[test]
    fn unknown_and_near_miss_names_are_rejected() {
        for name in ["unknown_type", "", "Users", "users.json", "../users"] {
            assert!(matches!(name.parse::<DataType>(), Err(ServiceError::UnknownDataType(n)) if n == name));
        }
    }
}
