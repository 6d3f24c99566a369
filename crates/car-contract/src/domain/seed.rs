//! # Ledger Seed
//!
//! Fixed initial set of users and cars written by `InitLedger`.

use crate::domain::entities::{Car, User};
use crate::domain::value_objects::Amount;

/// Initial ledger contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedSet {
    /// Users, written first.
    pub users: Vec<User>,
    /// Cars, written after the users.
    pub cars: Vec<Car>,
}

impl SeedSet {
    /// Number of records the seed writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len() + self.cars.len()
    }

    /// True if the seed writes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.cars.is_empty()
    }
}

impl Default for SeedSet {
    fn default() -> Self {
        let users = vec![
            User::new("user1", "Marko", "Markovic", "marko@gugl.com", Amount::from_units(9000)),
            User::new("user2", "Petar", "Petrovic", "petar@jahu.com", Amount::from_units(3500)),
            User::new("user3", "Nikola", "Nikolic", "nikola@bing.com", Amount::from_units(4000)),
        ];

        let cars = vec![
            Car::new("car1", "Ferrari", "F40", "1990", "Red", "user1", Amount::from_units(5000)),
            Car::new("car2", "Rolls Royce", "Phantom", "2018", "Black", "user1", Amount::from_units(20000)),
            Car::new("car3", "Ford", "GT40", "1969", "Blue", "user1", Amount::from_units(7000)),
            Car::new("car4", "Ford", "Mustang", "2020", "Black", "user2", Amount::from_units(12000)),
            Car::new("car5", "Tesla", "S", "2019", "White", "user2", Amount::from_units(9000)),
            Car::new("car6", "Mazda", "6", "2018", "Grey", "user2", Amount::from_units(10000)),
        ];

        Self { users, cars }
    }
}
