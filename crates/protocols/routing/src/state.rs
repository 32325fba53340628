//! Routing request and payload types
//!
//! The route model itself lives in `aggregator-core`; this module holds what
//! enters the pipeline (a price request) and what leaves it (a transaction
//! build request).

use aggregator_core::{
    Address, Amount, BlockNumber, ContractMethod, NetworkId, ProtocolVersion, Rate, Token,
    TradeSide,
};
use serde::{Deserialize, Serialize};
use venue_client::{PricingQuery, TransferFeeParams};

/// Trade a price route is requested for
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    pub src_token: Token,
    pub dest_token: Token,
    /// Fixed side of the trade: input for SELL, output for BUY
    pub amount: Amount,
    pub side: TradeSide,
    pub network: NetworkId,
    pub block_number: BlockNumber,
    /// Candidate venues, in the order quotes should be considered
    pub venues: Vec<String>,
    pub version: ProtocolVersion,
    #[serde(default)]
    pub transfer_fees: TransferFeeParams,
    /// Entrypoint override; derived from side and version when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_method: Option<ContractMethod>,
}

impl PriceRequest {
    pub fn pricing_query(&self) -> PricingQuery {
        PricingQuery {
            src_token: self.src_token.clone(),
            dest_token: self.dest_token.clone(),
            side: self.side,
            block_number: self.block_number,
            transfer_fees: self.transfer_fees,
        }
    }

    pub fn contract_method(&self) -> ContractMethod {
        self.contract_method
            .unwrap_or_else(|| ContractMethod::default_for(self.side, self.version))
    }
}

/// Transaction build request handed to the encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub price_route: Rate,
    /// Minimum output (SELL) or maximum input (BUY), decimal string
    pub min_max_amount: String,
    pub user_address: Address,
    pub partner_address: Address,
    pub partner_fee_percent: String,
    /// Unix seconds, decimal string
    pub deadline: String,
    pub uuid: String,
}
