//! Simulated real-time transactions and the bounded log that displays them.

use std::collections::VecDeque;

use rand::{Rng, seq::SliceRandom};

use crate::snapshot::CategorySlice;

/// The smallest simulated transaction amount.
pub const MIN_AMOUNT: u32 = 100;
/// The (exclusive) upper bound of simulated transaction amounts.
pub const MAX_AMOUNT: u32 = 1100;

/// A synthetic sale shown in the transaction log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedTransaction {
    /// The product sold.
    pub product: String,
    /// The sale amount in whole currency units, in `[100, 1100)`.
    pub amount: u32,
    /// The region the sale was made in.
    pub region: String,
}

impl SimulatedTransaction {
    /// Draw a transaction with a uniformly chosen product and region.
    ///
    /// Returns `None` if either breakdown is empty.
    pub fn generate<R: Rng>(
        rng: &mut R,
        products: &[CategorySlice],
        regions: &[CategorySlice],
    ) -> Option<Self> {
        let product = products.choose(rng)?.name().to_owned();
        let amount = rng.gen_range(MIN_AMOUNT..MAX_AMOUNT);
        let region = regions.choose(rng)?.name().to_owned();

        Some(Self {
            product,
            amount,
            region,
        })
    }
}

/// The most recent transactions, newest first, up to a fixed capacity.
#[derive(Debug, Clone)]
pub struct TransactionLog {
    entries: VecDeque<SimulatedTransaction>,
    capacity: usize,
}

impl TransactionLog {
    /// Create an empty log that keeps at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add `transaction` as the newest entry, evicting the oldest entries
    /// beyond the capacity.
    pub fn push(&mut self, transaction: SimulatedTransaction) {
        self.entries.push_front(transaction);
        self.entries.truncate(self.capacity);
    }

    /// The entries, newest first.
    pub fn entries(&self) -> Vec<SimulatedTransaction> {
        self.entries.iter().cloned().collect()
    }

    /// The number of entries in the log.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use crate::snapshot::DashboardSnapshot;

    use super::{MAX_AMOUNT, MIN_AMOUNT, SimulatedTransaction, TransactionLog};

    fn transaction(amount: u32) -> SimulatedTransaction {
        SimulatedTransaction {
            product: "Product A".to_owned(),
            amount,
            region: "North".to_owned(),
        }
    }

    #[test]
    fn newest_entry_comes_first() {
        let mut log = TransactionLog::new(10);

        log.push(transaction(100));
        log.push(transaction(200));

        assert_eq!(log.entries(), vec![transaction(200), transaction(100)]);
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut log = TransactionLog::new(3);

        for amount in [100, 200, 300, 400] {
            log.push(transaction(amount));
        }

        assert_eq!(
            log.entries(),
            vec![transaction(400), transaction(300), transaction(200)]
        );
    }

    #[test]
    fn generated_transactions_stay_in_range() {
        let snapshot = DashboardSnapshot::sample();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1000 {
            let got =
                SimulatedTransaction::generate(&mut rng, snapshot.products(), snapshot.regions())
                    .unwrap();

            assert!((MIN_AMOUNT..MAX_AMOUNT).contains(&got.amount));
            assert!(snapshot.products().iter().any(|p| p.name() == got.product));
            assert!(snapshot.regions().iter().any(|r| r.name() == got.region));
        }
    }

    #[test]
    fn cannot_generate_without_slices() {
        let mut rng = StdRng::seed_from_u64(42);

        assert_eq!(SimulatedTransaction::generate(&mut rng, &[], &[]), None);
    }
}
