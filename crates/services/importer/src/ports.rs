use header_sync_types::Address;

#[cfg_attr(any(test, feature = "test-helpers"), mockall::automock)]
/// The relay chain's view of who submitted the transaction.
pub trait OperatorWitness: Send + Sync {
    /// Returns the operator among the `tx_signers`, or fails if none of them is one.
    fn authorize(&self, tx_signers: &[Address]) -> anyhow::Result<Address>;
}

/// Accepts transactions signed by one fixed operator address.
#[derive(Clone, Copy, Debug)]
pub struct StaticOperator(pub Address);

impl OperatorWitness for StaticOperator {
    fn authorize(&self, tx_signers: &[Address]) -> anyhow::Result<Address> {
        if tx_signers.contains(&self.0) {
            Ok(self.0)
        } else {
            Err(anyhow::anyhow!("{:?} didn't sign the transaction", self.0))
        }
    }
}
