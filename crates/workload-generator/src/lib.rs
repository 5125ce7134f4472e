//! Synthetic account/transaction workload generation.
//!
//! The generator produces lazy, finite batch sequences for the two record
//! kinds the benchmark imports: accounts (dense ids `0..N`) and transactions
//! (popularity-skewed account references, recency-skewed timestamps). A
//! sequence is consumed once; restarting means constructing a fresh
//! generator. Runs are deterministic when a seed is supplied and draw from
//! OS entropy otherwise.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Length of the transaction time window in seconds.
pub const YEAR_SECONDS: i64 = 365 * 24 * 3600;

/// Accounts are created within the first 30 days of the window.
pub const ACCOUNT_CREATION_WINDOW_SECONDS: i64 = 30 * 24 * 3600;

/// Default skew exponent for account popularity (higher = more skew
/// towards id 0).
pub const DEFAULT_SKEW: f64 = 2.0;

/// Account category, derived from the account id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Standard,
    Premium,
}

impl AccountType {
    /// Every tenth account is a premium account.
    pub fn for_id(id: i64) -> Self {
        if id % 10 == 0 {
            AccountType::Premium
        } else {
            AccountType::Standard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Standard => "Standard",
            AccountType::Premium => "Premium",
        }
    }
}

/// A generated account node.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub account_type: AccountType,
    /// Unix seconds within the account creation window.
    pub created_at: i64,
}

/// A generated money-transfer transaction.
///
/// `from_account` and `to_account` are account ids in `0..num_accounts` and
/// may coincide. `currency` and `status` are constant in this workload.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: i64,
    /// Currency value rounded to 2 decimal places, uniform in [1.00, 10000.00].
    pub amount: f64,
    /// Unix seconds, recency-skewed within the one-year window.
    pub ts: i64,
    pub currency: &'static str,
    pub status: &'static str,
    pub from_account: i64,
    pub to_account: i64,
}

/// Map a uniform draw `u ∈ [0, 1)` to an index in `0..n`, concentrating
/// mass near index 0 for skew exponents above 1.
pub fn skewed_index(u: f64, n: u64, skew: f64) -> u64 {
    ((n as f64 * u.powf(skew)) as u64).min(n.saturating_sub(1))
}

/// Map a uniform draw `u ∈ [0, 1)` to a second offset in `0..window_seconds`,
/// concentrating mass towards the end of the window (recent activity).
pub fn recency_offset(u: f64, window_seconds: i64) -> i64 {
    ((window_seconds as f64 * u.sqrt()) as i64).min(window_seconds - 1)
}

/// Produces account and transaction batches for one benchmark run.
pub struct WorkloadGenerator {
    num_accounts: u64,
    skew: f64,
    start_epoch: i64,
    rng: StdRng,
}

impl WorkloadGenerator {
    /// Create a generator over `num_accounts` accounts whose time window
    /// begins at `start_epoch` (unix seconds). A `seed` makes the produced
    /// sequences reproducible.
    pub fn new(num_accounts: u64, start_epoch: i64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            num_accounts,
            skew: DEFAULT_SKEW,
            start_epoch,
            rng,
        }
    }

    /// Override the account popularity skew exponent.
    pub fn with_skew(mut self, skew: f64) -> Self {
        self.skew = skew;
        self
    }

    pub fn start_epoch(&self) -> i64 {
        self.start_epoch
    }

    /// Lazily yield `count` accounts in batches of at most `batch_size`.
    /// The final batch may be partial.
    pub fn accounts(&mut self, count: u64, batch_size: usize) -> AccountBatches<'_> {
        AccountBatches {
            generator: self,
            next_id: 0,
            remaining: count,
            batch_size: batch_size.max(1),
        }
    }

    /// Lazily yield `count` transactions with ids starting at 0.
    pub fn transactions(&mut self, count: u64, batch_size: usize) -> TransactionBatches<'_> {
        self.transactions_from(count, batch_size, 0)
    }

    /// Lazily yield `count` transactions with ids starting at `first_id`.
    /// The offset keeps synthetic write-test records clear of imported data.
    pub fn transactions_from(
        &mut self,
        count: u64,
        batch_size: usize,
        first_id: i64,
    ) -> TransactionBatches<'_> {
        TransactionBatches {
            generator: self,
            next_id: first_id,
            remaining: count,
            batch_size: batch_size.max(1),
        }
    }

    /// Draw an account id with the popularity skew. Low ids behave as
    /// super-nodes.
    pub fn pick_account_id(&mut self) -> i64 {
        skewed_index(self.rng.random::<f64>(), self.num_accounts, self.skew) as i64
    }

    fn next_account(&mut self, id: i64) -> Account {
        Account {
            id,
            name: format!("Acc_{id}"),
            account_type: AccountType::for_id(id),
            created_at: self.start_epoch + self.rng.random_range(0..ACCOUNT_CREATION_WINDOW_SECONDS),
        }
    }

    fn next_transaction(&mut self, id: i64) -> Transaction {
        let amount: f64 = (self.rng.random_range(1.0f64..=10000.0) * 100.0).round() / 100.0;
        let ts = self.start_epoch + recency_offset(self.rng.random::<f64>(), YEAR_SECONDS);
        Transaction {
            id,
            amount,
            ts,
            currency: "USD",
            status: "COMPLETED",
            from_account: self.pick_account_id(),
            to_account: self.pick_account_id(),
        }
    }
}

/// Lazy iterator over account batches.
pub struct AccountBatches<'a> {
    generator: &'a mut WorkloadGenerator,
    next_id: i64,
    remaining: u64,
    batch_size: usize,
}

impl Iterator for AccountBatches<'_> {
    type Item = Vec<Account>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let take = self.remaining.min(self.batch_size as u64);
        let mut batch = Vec::with_capacity(take as usize);
        for _ in 0..take {
            let id = self.next_id;
            self.next_id += 1;
            batch.push(self.generator.next_account(id));
        }
        self.remaining -= take;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let batches = self.remaining.div_ceil(self.batch_size as u64) as usize;
        (batches, Some(batches))
    }
}

impl ExactSizeIterator for AccountBatches<'_> {}

/// Lazy iterator over transaction batches.
pub struct TransactionBatches<'a> {
    generator: &'a mut WorkloadGenerator,
    next_id: i64,
    remaining: u64,
    batch_size: usize,
}

impl Iterator for TransactionBatches<'_> {
    type Item = Vec<Transaction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let take = self.remaining.min(self.batch_size as u64);
        let mut batch = Vec::with_capacity(take as usize);
        for _ in 0..take {
            let id = self.next_id;
            self.next_id += 1;
            batch.push(self.generator.next_transaction(id));
        }
        self.remaining -= take;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let batches = self.remaining.div_ceil(self.batch_size as u64) as usize;
        (batches, Some(batches))
    }
}

impl ExactSizeIterator for TransactionBatches<'_> {}
