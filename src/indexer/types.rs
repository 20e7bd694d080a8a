//! Indexer query and response types

use serde::{Deserialize, Serialize};

/// Upper bound on records requested per history query
pub const HISTORY_PAGE_SIZE: u32 = 10;

/// Variables of the history query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryQuery {
    pub network: String,
    pub address: String,
    pub limit: u32,
    pub offset: u32,
    /// ISO 8601
    pub from: String,
    /// ISO 8601
    pub till: String,
}

/// One historical transaction as shown by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: String,
    pub block_height: u64,
    pub timestamp: String,
    pub kind: String,
    /// Fee in ALGO
    pub fee: f64,
    pub fee_usd: Option<f64>,
    pub currency_symbol: String,
}

/// Aggregated transfer row touching an address as sender or receiver
///
/// The sums and counts are per row, over the queried address's side of
/// the transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub sender: String,
    pub receiver: String,
    pub amount: f64,
    pub sum_in: f64,
    pub sum_out: f64,
    pub count_in: u64,
    pub count_out: u64,
    pub currency_symbol: String,
    pub date: String,
}

// Wire format of the GraphQL response

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    pub data: Option<GraphQlData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlData {
    pub algorand: Option<AlgorandData>,
}

#[derive(Debug, Deserialize)]
pub struct AlgorandData {
    #[serde(default)]
    pub transactions: Option<Vec<RawTransaction>>,
    #[serde(default)]
    pub transfers: Option<Vec<RawTransfer>>,
}

#[derive(Debug, Deserialize)]
pub struct RawTransaction {
    pub hash: String,
    pub block: RawBlock,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub fee: f64,
    #[serde(default)]
    pub fee_usd: Option<f64>,
    pub currency: Option<RawCurrency>,
}

#[derive(Debug, Deserialize)]
pub struct RawBlock {
    pub height: u64,
    pub timestamp: RawTimestamp,
}

#[derive(Debug, Deserialize)]
pub struct RawTimestamp {
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct RawCurrency {
    #[serde(default)]
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct RawTransfer {
    #[serde(default)]
    pub sum_in: Option<f64>,
    #[serde(default)]
    pub sum_out: Option<f64>,
    #[serde(default)]
    pub count_in: Option<u64>,
    #[serde(default)]
    pub count_out: Option<u64>,
    pub currency: Option<RawCurrency>,
    pub receiver: Option<RawAddress>,
    pub sender: Option<RawAddress>,
    #[serde(default)]
    pub amount: f64,
    pub date: Option<RawDate>,
}

#[derive(Debug, Deserialize)]
pub struct RawAddress {
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct RawDate {
    pub date: String,
}

impl From<RawTransfer> for TransferRecord {
    fn from(raw: RawTransfer) -> Self {
        Self {
            sender: raw.sender.map(|a| a.address).unwrap_or_default(),
            receiver: raw.receiver.map(|a| a.address).unwrap_or_default(),
            amount: raw.amount,
            sum_in: raw.sum_in.unwrap_or_default(),
            sum_out: raw.sum_out.unwrap_or_default(),
            count_in: raw.count_in.unwrap_or_default(),
            count_out: raw.count_out.unwrap_or_default(),
            currency_symbol: raw.currency.map(|c| c.symbol).unwrap_or_default(),
            date: raw.date.map(|d| d.date).unwrap_or_default(),
        }
    }
}

impl From<RawTransaction> for TransactionRecord {
    fn from(raw: RawTransaction) -> Self {
        Self {
            hash: raw.hash,
            block_height: raw.block.height,
            timestamp: raw.block.timestamp.time,
            kind: raw.kind,
            fee: raw.fee,
            fee_usd: raw.fee_usd,
            currency_symbol: raw.currency.map(|c| c.symbol).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_bitquery_json() {
        let json = r#"{
            "data": {"algorand": {"transactions": [{
                "block": {"timestamp": {"time": "2024-08-20 10:11:12"}, "height": 41000000},
                "hash": "TXHASH",
                "type": "pay",
                "fee": 0.001,
                "fee_usd": 0.00012,
                "currency": {"tokenId": 0, "symbol": "ALGO"}
            }]}}
        }"#;
        let response: GraphQlResponse = serde_json::from_str(json).unwrap();
        let raw = response.data.unwrap().algorand.unwrap().transactions.unwrap();
        let record = TransactionRecord::from(raw.into_iter().next().unwrap());

        assert_eq!(record.hash, "TXHASH");
        assert_eq!(record.block_height, 41_000_000);
        assert_eq!(record.timestamp, "2024-08-20 10:11:12");
        assert_eq!(record.currency_symbol, "ALGO");
        assert_eq!(record.fee_usd, Some(0.00012));
    }

    #[test]
    fn test_transfer_from_bitquery_json() {
        let json = r#"{
            "data": {"algorand": {"transfers": [{
                "sum_in": 2.5,
                "sum_out": null,
                "count_in": 1,
                "count_out": 0,
                "currency": {"tokenId": "0", "symbol": "ALGO"},
                "receiver": {"address": "ME"},
                "sender": {"address": "THEM"},
                "amount": 2.5,
                "date": {"date": "2024-08-20"}
            }]}}
        }"#;
        let response: GraphQlResponse = serde_json::from_str(json).unwrap();
        let algorand = response.data.unwrap().algorand.unwrap();
        assert!(algorand.transactions.is_none());
        let raw = algorand.transfers.unwrap();
        let transfer = TransferRecord::from(raw.into_iter().next().unwrap());

        assert_eq!(transfer.sender, "THEM");
        assert_eq!(transfer.receiver, "ME");
        assert_eq!(transfer.sum_in, 2.5);
        assert_eq!(transfer.sum_out, 0.0);
        assert_eq!(transfer.count_in, 1);
        assert_eq!(transfer.date, "2024-08-20");
    }

    #[test]
    fn test_errors_without_data() {
        let json = r#"{"data": null, "errors": [{"message": "Unauthorized"}]}"#;
        let response: GraphQlResponse = serde_json::from_str(json).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].message, "Unauthorized");
    }
}
