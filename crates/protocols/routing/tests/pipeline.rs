//! End-to-end pipeline tests against in-memory collaborators

use std::sync::Arc;

use aggregator_core::{
    Address, AggregatorError, Amount, ContractMethod, ExchangeData, GasCost, MergeConfig,
    PathLeg, PipelineConfig, ProtocolVersion, Quote, Rate, SwapExchange, Token, TradeSide,
    VenueError,
};
use async_trait::async_trait;
use routing::{merge_routes, BestTerminalAmount, PriceRequest, RoutePipeline};
use venue_client::{
    Capability, ExecutorRecipient, PreprocessInfo, PreprocessOptions, Preprocessor, PricingQuery,
    PricingSource, Venue, VenueRegistry,
};

const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
const DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";
const WBTC: &str = "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599";
const USER: &str = "0x00000000000000000000000000000000000000aa";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Constant-rate pricing: each venue quotes `amount * rate_bps / 10_000`
struct FixedRatePricing {
    rates: Vec<(&'static str, u32)>,
}

#[async_trait]
impl PricingSource for FixedRatePricing {
    async fn pool_identifiers(
        &self,
        _query: &PricingQuery,
        venue: &str,
    ) -> venue_client::Result<Vec<String>> {
        if self.rates.iter().any(|(name, _)| *name == venue) {
            Ok(vec![format!("{}_weth_usdc", venue.to_lowercase())])
        } else {
            Ok(vec![])
        }
    }

    async fn pool_prices(
        &self,
        query: &PricingQuery,
        venue: &str,
        amounts: &[Amount],
        pool_identifiers: &[String],
    ) -> venue_client::Result<Vec<Quote>> {
        let Some((_, rate_bps)) = self.rates.iter().find(|(name, _)| *name == venue) else {
            return Err(VenueError::UnsupportedPair {
                src: query.src_token.address.to_string(),
                dest: query.dest_token.address.to_string(),
            });
        };
        let prices = amounts
            .iter()
            .map(|a| Amount(a.as_biguint().clone() * *rate_bps / 10_000u32))
            .collect();
        Ok(vec![Quote {
            exchange: venue.to_string(),
            prices,
            data: ExchangeData::with_path(vec![PathLeg::new(
                query.src_token.address.clone(),
                query.dest_token.address.clone(),
            )]),
            gas_cost: GasCost::Curve(vec![90_000; amounts.len()]),
            pool_addresses: vec![Address::new(
                "0x88e6A0c2dDD26FEEb64F039a2c41296FcB3f5640",
            )],
            pool_identifier: pool_identifiers.first().cloned(),
        }])
    }
}

struct PlainVenue(&'static str);

impl Venue for PlainVenue {
    fn name(&self) -> &str {
        self.0
    }
}

/// Venue that stamps a deadline and the recipient into the leg data
struct DeadlineVenue {
    name: &'static str,
    deadline: u64,
}

#[async_trait]
impl Preprocessor for DeadlineVenue {
    fn token_from_address(&self, address: &Address) -> Option<Token> {
        Some(Token::new(address.clone(), 18))
    }

    async fn pre_process_transaction(
        &self,
        mut exchange: SwapExchange,
        _src_token: &Token,
        _dest_token: &Token,
        _side: TradeSide,
        options: &PreprocessOptions,
    ) -> venue_client::Result<(SwapExchange, PreprocessInfo)> {
        exchange
            .data
            .extra
            .insert("recipient".into(), options.recipient.to_string().into());
        Ok((
            exchange,
            PreprocessInfo {
                deadline: Some(self.deadline),
            },
        ))
    }
}

impl Venue for DeadlineVenue {
    fn name(&self) -> &str {
        self.name
    }

    fn preprocessing(&self) -> Capability<&dyn Preprocessor> {
        Capability::Supported(self)
    }
}

fn sell_request(venues: &[&str]) -> PriceRequest {
    PriceRequest {
        src_token: Token::new(Address::new(WETH), 18),
        dest_token: Token::new(Address::new(USDC), 6),
        amount: Amount::from(10_000_000_000_000_000_000u128),
        side: TradeSide::Sell,
        network: 1,
        block_number: 19_500_000,
        venues: venues.iter().map(|v| v.to_string()).collect(),
        version: ProtocolVersion::V6,
        transfer_fees: Default::default(),
        contract_method: None,
    }
}

/// A four-hop V6 rate as produced by upstream route building
fn multi_hop_rate() -> Rate {
    let json = format!(
        r#"{{
        "blockNumber": 19500000,
        "network": 1,
        "side": "SELL",
        "srcToken": "{WETH}",
        "srcDecimals": 18,
        "srcAmount": "1000000000000000000",
        "destToken": "{WBTC}",
        "destDecimals": 8,
        "destAmount": "5400000",
        "bestRoute": [{{
            "percent": 100,
            "swaps": [
                {{
                    "srcToken": "{WETH}", "srcDecimals": 18,
                    "destToken": "{USDC}", "destDecimals": 6,
                    "swapExchanges": [{{
                        "exchange": "UniswapV3",
                        "srcAmount": "1000000000000000000",
                        "destAmount": "3500000000",
                        "percent": 100,
                        "data": {{"path": [{{"tokenIn": "{WETH}", "tokenOut": "{USDC}", "fee": 500}}], "gasUSD": "1"}},
                        "poolAddresses": ["0x88e6A0c2dDD26FEEb64F039a2c41296FcB3f5640"],
                        "gasUSD": "1.25"
                    }}]
                }},
                {{
                    "srcToken": "{USDC}", "srcDecimals": 6,
                    "destToken": "{DAI}", "destDecimals": 18,
                    "swapExchanges": [{{
                        "exchange": "SushiSwapV3",
                        "srcAmount": "3500000000",
                        "destAmount": "3499000000000000000000",
                        "percent": 100,
                        "data": {{"path": [{{"tokenIn": "{}", "tokenOut": "{DAI}", "fee": 100}}]}},
                        "poolAddresses": ["0x5777d92f208679DB4b9778590Fa3CAB3aC9e2168"],
                        "gasUSD": "0.333333"
                    }}]
                }},
                {{
                    "srcToken": "{DAI}", "srcDecimals": 18,
                    "destToken": "{WBTC}", "destDecimals": 8,
                    "swapExchanges": [
                        {{
                            "exchange": "CurveV1",
                            "srcAmount": "1749500000000000000000",
                            "destAmount": "2700000",
                            "percent": 50,
                            "poolAddresses": [],
                            "gasUSD": "2"
                        }},
                        {{
                            "exchange": "BalancerV2",
                            "srcAmount": "1749500000000000000000",
                            "destAmount": "2700000",
                            "percent": 50,
                            "poolAddresses": [],
                            "gasUSD": "2"
                        }}
                    ]
                }}
            ]
        }}],
        "version": "6.2",
        "gasCost": "420000",
        "gasCostUSD": "5.583333",
        "srcUSD": "3500",
        "destUSD": "3490",
        "contractMethod": "swapExactAmountIn"
    }}"#,
        USDC.to_lowercase()
    );
    serde_json::from_str(&json).unwrap()
}

fn registry(deadline: u64) -> VenueRegistry {
    VenueRegistry::new()
        .with(Arc::new(PlainVenue("UniswapV3")))
        .with(Arc::new(PlainVenue("SushiSwapV3")))
        .with(Arc::new(PlainVenue("CurveV1")))
        .with(Arc::new(DeadlineVenue {
            name: "BalancerV2",
            deadline,
        }))
}

#[tokio::test]
async fn test_price_then_assemble_sell() {
    init_tracing();
    let pricing = FixedRatePricing {
        rates: vec![("UniswapV3", 9_970), ("CurveV1", 9_990)],
    };
    let config = PipelineConfig::default();
    let registry = registry(u64::MAX);
    let pipeline = RoutePipeline::new(&config, &pricing, &registry, &ExecutorRecipient);

    let rate = pipeline
        .price(&sell_request(&["Unlisted", "UniswapV3", "CurveV1"]))
        .await
        .unwrap();
    assert_eq!(rate.best_route[0].swaps[0].swap_exchanges[0].exchange, "UniswapV3");
    assert_eq!(rate.dest_amount, Amount::from(9_970_000_000_000_000_000u128));
    assert_eq!(rate.gas_cost, "90000");
    assert!(rate.validate().is_ok());

    let min_out = Amount::from(9_900_000_000_000_000_000u128);
    let tx = pipeline
        .build_transaction(rate.clone(), &min_out, &Address::new(USER))
        .await
        .unwrap();
    assert_eq!(tx.price_route, rate);
    assert_eq!(tx.min_max_amount, "9900000000000000000");
    assert!(tx.deadline.parse::<u64>().is_ok());
}

#[tokio::test]
async fn test_policy_picks_best_terminal() {
    let pricing = FixedRatePricing {
        rates: vec![("UniswapV3", 9_970), ("CurveV1", 9_990)],
    };
    let config = PipelineConfig::default();
    let registry = registry(u64::MAX);
    let pipeline = RoutePipeline::new(&config, &pricing, &registry, &ExecutorRecipient)
        .with_policy(&BestTerminalAmount);

    let rate = pipeline
        .price(&sell_request(&["UniswapV3", "CurveV1"]))
        .await
        .unwrap();
    assert_eq!(rate.best_route[0].swaps[0].swap_exchanges[0].exchange, "CurveV1");
}

#[tokio::test]
async fn test_no_venue_quotes() {
    let pricing = FixedRatePricing { rates: vec![] };
    let config = PipelineConfig::default();
    let registry = registry(u64::MAX);
    let pipeline = RoutePipeline::new(&config, &pricing, &registry, &ExecutorRecipient);

    let err = pipeline
        .price(&sell_request(&["UniswapV3"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AggregatorError::NoLiquidity { .. }));
    assert_eq!(err.error_code(), "no_liquidity");
}

#[tokio::test]
async fn test_merge_then_assemble_multi_hop() {
    init_tracing();
    let rate = multi_hop_rate();
    assert!(rate.validate().is_ok());

    let merged = merge_routes(rate.clone(), &MergeConfig::default());
    assert_eq!(merged.best_route.len(), 1);
    assert_eq!(merged.src_amount, rate.src_amount);
    assert_eq!(merged.dest_amount, rate.dest_amount);
    assert!(merged.validate().is_ok());

    let swaps = &merged.best_route[0].swaps;
    assert_eq!(swaps.len(), 2);

    let fused = &swaps[0].swap_exchanges[0];
    assert_eq!(swaps[0].src_token, Address::new(WETH));
    assert_eq!(swaps[0].dest_token, Address::new(DAI));
    assert_eq!(swaps[0].dest_decimals, 18);
    assert_eq!(fused.gas_usd, "1.583333");
    assert_eq!(fused.dest_amount, Amount::from(3_499_000_000_000_000_000_000u128));
    assert_eq!(fused.pool_addresses.len(), 2);

    let path = fused.path().unwrap();
    assert_eq!(path.len(), 2);
    assert_eq!(path[0].token_out, path[1].token_in);
    assert_eq!(path[0].extra["fee"], 500);
    assert_eq!(path[1].extra["fee"], 100);
    // Unknown exchange data fields survive the merge
    assert_eq!(fused.data.extra["gasUSD"], "1");

    assert_eq!(merge_routes(merged.clone(), &MergeConfig::default()), merged);

    let config = PipelineConfig::default();
    let pricing = FixedRatePricing { rates: vec![] };
    let now = 1_700_000_000;
    let registry = registry(now + 300);
    let pipeline = RoutePipeline::new(&config, &pricing, &registry, &ExecutorRecipient);

    let min_out = Amount::from(5_346_000u64);
    let tx = pipeline
        .assembler()
        .build_transaction_at(merged.clone(), &min_out, &Address::new(USER), now)
        .await
        .unwrap();

    assert_eq!(tx.deadline, (now + 300).to_string());
    let hops = &tx.price_route.best_route[0].swaps;
    assert_eq!(hops[0], merged.best_route[0].swaps[0]);
    assert_eq!(hops[1].swap_exchanges[0], merged.best_route[0].swaps[1].swap_exchanges[0]);
    assert_eq!(
        hops[1].swap_exchanges[1].data.extra["recipient"],
        aggregator_core::constants::NULL_ADDRESS
    );

    let json = serde_json::to_value(&tx).unwrap();
    assert_eq!(json["partnerAddress"], aggregator_core::constants::NULL_ADDRESS);
    assert_eq!(json["partnerFeePercent"], "0");
    assert_eq!(json["priceRoute"]["version"], "6.2");
    assert_eq!(json["priceRoute"]["contractMethod"], "swapExactAmountIn");
}

#[tokio::test]
async fn test_malformed_rate_not_assembled() {
    let mut rate = multi_hop_rate();
    rate.best_route[0].percent = 90;

    let config = PipelineConfig::default();
    let pricing = FixedRatePricing { rates: vec![] };
    let registry = registry(u64::MAX);
    let pipeline = RoutePipeline::new(&config, &pricing, &registry, &ExecutorRecipient);

    let err = pipeline
        .build_transaction(rate, &Amount::from(5_346_000u64), &Address::new(USER))
        .await
        .unwrap_err();
    assert!(matches!(err, AggregatorError::InvalidRoute { .. }));
    assert_eq!(err.error_code(), "invalid_route");
}

#[tokio::test]
async fn test_legacy_rate_skips_merge() {
    let mut rate = multi_hop_rate();
    rate.version = ProtocolVersion::V5;
    rate.contract_method = ContractMethod::MultiSwap;

    let merged = merge_routes(rate.clone(), &MergeConfig::default());
    assert_eq!(merged, rate);
    assert_eq!(merged.hop_count(), 3);
}
