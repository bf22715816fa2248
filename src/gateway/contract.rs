//! Ledger channel and contract references; the transaction driver entry points.

use crate::gateway::proposal::{build_proposal, Invocation, ProposalOptions};
use crate::gateway::session::Gateway;
use crate::gateway::transaction;
use crate::gateway::types::{CommitStatus, GatewayError, GatewayResult, Phase};

/// A ledger channel bound to a session.
#[derive(Debug, Clone, Copy)]
pub struct Network<'a> {
    gateway: &'a Gateway,
    channel_name: &'a str,
}

impl<'a> Network<'a> {
    pub(crate) fn new(gateway: &'a Gateway, channel_name: &'a str) -> Self {
        Self {
            gateway,
            channel_name,
        }
    }

    pub fn name(&self) -> &str {
        self.channel_name
    }

    /// Bind a deployed contract on this channel.
    pub fn get_contract(&self, chaincode_name: &'a str) -> Contract<'a> {
        Contract {
            gateway: self.gateway,
            channel_name: self.channel_name,
            chaincode_name,
        }
    }
}

/// A deployed contract on a ledger channel.
#[derive(Debug, Clone, Copy)]
pub struct Contract<'a> {
    gateway: &'a Gateway,
    channel_name: &'a str,
    chaincode_name: &'a str,
}

impl<'a> Contract<'a> {
    pub fn channel_name(&self) -> &str {
        self.channel_name
    }

    pub fn chaincode_name(&self) -> &str {
        self.chaincode_name
    }

    /// Evaluate a read-only transaction on a single peer.
    pub async fn evaluate(&self, function: &str, args: &[&str]) -> GatewayResult<Vec<u8>> {
        self.evaluate_with(function, args, &ProposalOptions::default()).await
    }

    /// Evaluate with transient data or target organizations.
    pub async fn evaluate_with(
        &self,
        function: &str,
        args: &[&str],
        options: &ProposalOptions,
    ) -> GatewayResult<Vec<u8>> {
        let proposal = build_proposal(
            self.gateway.creator(),
            self.gateway.signer(),
            self.invocation(function, args, options),
        )?;
        let transaction_id = proposal.transaction_id.clone();

        tracing::info!(
            transaction_id = %transaction_id,
            channel = %self.channel_name,
            chaincode = %self.chaincode_name,
            function = %function,
            "Evaluating transaction"
        );

        let deadline = self.gateway.timeouts().deadline(Phase::Evaluate);
        transaction::evaluate(self.gateway.client(), proposal, deadline).await
    }

    /// Submit a transaction and wait for it to commit.
    ///
    /// Returns the chaincode result once the transaction is committed and
    /// validated.
    pub async fn submit(&self, function: &str, args: &[&str]) -> GatewayResult<Vec<u8>> {
        self.submit_with(function, args, &ProposalOptions::default()).await
    }

    /// Submit with transient data or endorsing organizations.
    pub async fn submit_with(
        &self,
        function: &str,
        args: &[&str],
        options: &ProposalOptions,
    ) -> GatewayResult<Vec<u8>> {
        let submitted = self.submit_async(function, args, options).await?;
        let status = submitted.status().await?;
        if !status.is_successful() {
            return Err(GatewayError::Commit {
                transaction_id: status.transaction_id,
                code: status.code,
                block_number: status.block_number,
            });
        }

        tracing::info!(
            transaction_id = %status.transaction_id,
            block_number = status.block_number,
            "Transaction committed"
        );
        Ok(submitted.into_result())
    }

    /// Endorse and submit, without waiting for the commit.
    pub async fn submit_async(
        &self,
        function: &str,
        args: &[&str],
        options: &ProposalOptions,
    ) -> GatewayResult<SubmittedTransaction<'a>> {
        let proposal = build_proposal(
            self.gateway.creator(),
            self.gateway.signer(),
            self.invocation(function, args, options),
        )?;

        tracing::info!(
            transaction_id = %proposal.transaction_id,
            channel = %self.channel_name,
            chaincode = %self.chaincode_name,
            function = %function,
            "Submitting transaction"
        );

        let timeouts = self.gateway.timeouts();
        let endorsed = transaction::endorse(
            self.gateway.client(),
            proposal,
            timeouts.deadline(Phase::Endorse),
        )
        .await?;
        transaction::submit(
            self.gateway.client(),
            self.gateway.signer(),
            &endorsed,
            timeouts.deadline(Phase::Submit),
        )
        .await?;

        Ok(SubmittedTransaction {
            gateway: self.gateway,
            transaction_id: endorsed.transaction_id,
            channel_name: endorsed.channel_name,
            result: endorsed.result,
        })
    }

    fn invocation<'b>(
        &'b self,
        function: &'b str,
        args: &'b [&'b str],
        options: &'b ProposalOptions,
    ) -> Invocation<'b> {
        Invocation {
            channel_name: self.channel_name,
            chaincode_name: self.chaincode_name,
            function,
            args,
            options,
        }
    }
}

/// A transaction accepted by the ordering service, not yet confirmed.
#[derive(Debug)]
pub struct SubmittedTransaction<'a> {
    gateway: &'a Gateway,
    transaction_id: String,
    channel_name: String,
    result: Vec<u8>,
}

impl<'a> SubmittedTransaction<'a> {
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Chaincode result produced during endorsement.
    pub fn result(&self) -> &[u8] {
        &self.result
    }

    pub fn into_result(self) -> Vec<u8> {
        self.result
    }

    /// Wait for the commit status.
    ///
    /// An invalid validation code is reported in the returned status, not
    /// as an error; only a missing confirmation fails.
    pub async fn status(&self) -> GatewayResult<CommitStatus> {
        transaction::commit_status(
            self.gateway.client(),
            self.gateway.signer(),
            self.gateway.creator(),
            &self.transaction_id,
            &self.channel_name,
            self.gateway.timeouts().deadline(Phase::CommitStatus),
        )
        .await
    }
}
