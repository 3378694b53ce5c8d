//! Deposit leaderboard.
//!
//! Reduces a deposit list into per-address totals ranked by amount.

use std::collections::{HashMap, hash_map};

use alloy::primitives::{Address, U256};
use fastnum::UD256;

use crate::{
    num,
    types::{Deposit, LEADERBOARD_SIZE, TimeFilter, UnixSeconds},
};

/// Cumulative deposits of a single address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeaderboardEntry {
    address: Address,
    amount: UD256,
}

impl LeaderboardEntry {
    pub fn new(address: Address, amount: UD256) -> Self {
        Self { address, amount }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Lowercase hex form of the address.
    pub fn address_lower(&self) -> String {
        crate::lower_hex(&self.address)
    }

    /// Total deposited, ETH.
    pub fn amount(&self) -> UD256 {
        self.amount
    }

    pub fn amount_wei(&self) -> U256 {
        num::Converter::eth().to_unsigned(self.amount)
    }

    /// Total deposited, formatted in ETH.
    pub fn amount_display(&self) -> String {
        num::format_ether(self.amount_wei())
    }
}

/// Ranks depositors by their total deposits.
///
/// Deposits older than the `filter` window at `now` are dropped first.
/// Entries are unique per address, sorted by amount descending with ties
/// in order of first appearance, and truncated to [`LEADERBOARD_SIZE`].
pub fn aggregate(deposits: &[Deposit], filter: TimeFilter, now: UnixSeconds) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = Vec::new();
    let mut index: HashMap<Address, usize> = HashMap::new();

    for deposit in deposits.iter().filter(|d| filter.admits(d, now)) {
        match index.entry(deposit.depositor()) {
            hash_map::Entry::Occupied(slot) => {
                let entry = &mut entries[*slot.get()];
                entry.amount = entry.amount + deposit.amount();
            }
            hash_map::Entry::Vacant(slot) => {
                slot.insert(entries.len());
                entries.push(LeaderboardEntry::new(deposit.depositor(), deposit.amount()));
            }
        }
    }

    entries.sort_by(|a, b| b.amount.cmp(&a.amount));
    entries.truncate(LEADERBOARD_SIZE);
    entries
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use fastnum::udec256;

    use super::*;

    const NOW: UnixSeconds = 1_700_000_000;

    fn eth(amount: u64) -> U256 {
        U256::from(amount) * U256::from(10u64).pow(U256::from(15u64))
    }

    fn addr(n: u8) -> Address {
        Address::with_last_byte(n)
    }

    #[test]
    fn test_same_address_deposits_are_summed() {
        let a = address!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let deposits = vec![
            Deposit::from_wei(a, eth(500), NOW - 10),
            Deposit::from_wei(addr(2), eth(100), NOW - 20),
            Deposit::from_wei(a, eth(250), NOW - 30),
        ];

        let board = aggregate(&deposits, TimeFilter::All, NOW);
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].address(), a);
        assert_eq!(board[0].address_lower(), "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        assert_eq!(board[0].amount(), udec256!(0.75));
        assert_eq!(board[0].amount_display(), "0.75");
        assert_eq!(board[1].amount(), udec256!(0.1));
    }

    #[test]
    fn test_sorted_unique_and_truncated() {
        let deposits: Vec<_> = (1..=25u8)
            .flat_map(|n| {
                vec![
                    Deposit::from_wei(addr(n), eth(n as u64), NOW - n as u64),
                    Deposit::from_wei(addr(n), eth(1), NOW - 1000),
                ]
            })
            .collect();

        let board = aggregate(&deposits, TimeFilter::All, NOW);
        assert_eq!(board.len(), LEADERBOARD_SIZE);
        assert!(board.windows(2).all(|w| w[0].amount() >= w[1].amount()));
        let unique: std::collections::HashSet<_> = board.iter().map(|e| e.address()).collect();
        assert_eq!(unique.len(), board.len());
        assert_eq!(board[0].address(), addr(25));
        assert_eq!(board[0].amount_wei(), eth(26));
    }

    #[test]
    fn test_totals_match_input_sums() {
        let deposits = vec![
            Deposit::from_wei(addr(1), eth(3), NOW),
            Deposit::from_wei(addr(2), eth(7), NOW),
            Deposit::from_wei(addr(1), eth(4), NOW),
            Deposit::from_wei(addr(3), eth(1), NOW),
            Deposit::from_wei(addr(2), eth(2), NOW),
        ];

        for entry in aggregate(&deposits, TimeFilter::All, NOW) {
            let expected = deposits
                .iter()
                .filter(|d| d.depositor() == entry.address())
                .fold(U256::ZERO, |acc, d| acc + d.amount_wei());
            assert_eq!(entry.amount_wei(), expected);
        }
    }

    #[test]
    fn test_window_is_subset_of_all() {
        let deposits = vec![
            Deposit::from_wei(addr(1), eth(5), NOW - 100),
            Deposit::from_wei(addr(2), eth(9), NOW - 200_000),
            Deposit::from_wei(addr(3), eth(2), NOW - 3_000_000),
            Deposit::from_wei(addr(1), eth(1), NOW - 700_000),
        ];

        let all = aggregate(&deposits, TimeFilter::All, NOW);
        let week = aggregate(&deposits, TimeFilter::Last7d, NOW);
        let day = aggregate(&deposits, TimeFilter::Last24h, NOW);

        assert_eq!(all.len(), 3);
        assert_eq!(week.len(), 2);
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].amount_wei(), eth(5));
        for entry in day.iter().chain(week.iter()) {
            assert!(all.iter().any(|e| e.address() == entry.address()));
        }
    }

    #[test]
    fn test_empty_results() {
        assert!(aggregate(&[], TimeFilter::All, NOW).is_empty());

        let old = vec![Deposit::from_wei(addr(1), eth(5), NOW - 90_000)];
        assert!(aggregate(&old, TimeFilter::Last24h, NOW).is_empty());
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let deposits = vec![
            Deposit::from_wei(addr(7), eth(5), NOW),
            Deposit::from_wei(addr(3), eth(5), NOW),
        ];
        let board = aggregate(&deposits, TimeFilter::All, NOW);
        assert_eq!(board[0].address(), addr(7));
        assert_eq!(board[1].address(), addr(3));
    }
}
