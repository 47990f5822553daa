//! Financial protocols: price, ledger.

use std::time::Duration;

use async_trait::async_trait;

use overwatch_net::{blockcypher, market};
use overwatch_types::error::Result;

use crate::format::{capped_lines, clip, format_btc, format_usd, resolve_pair};
use crate::interpreter::{Command, CommandRegistry, Context, Flow, TargetRule};

/// Register the financial protocols into a registry.
pub fn register_market_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(PriceCmd));
    reg.register(Box::new(LedgerCmd));
}

// ---------------------------------------------------------------------------
// price
// ---------------------------------------------------------------------------

/// Candle window bounds for the optional second argument.
const MIN_WINDOW: usize = 2;
const MAX_WINDOW: usize = 60;

struct PriceCmd;

#[async_trait]
impl Command for PriceCmd {
    fn name(&self) -> &str {
        "price"
    }
    fn description(&self) -> &str {
        "Live asset telemetry (e.g. price BTCUSDT 25)"
    }
    fn usage(&self) -> &str {
        "price [pair] [window]"
    }
    fn target_rule(&self) -> TargetRule {
        TargetRule::Optional
    }
    async fn execute(&self, target: Option<&str>, args: &[String], ctx: &Context) -> Result<Flow> {
        let pair = resolve_pair(target);
        ctx.console
            .system(format!("FETCHING MARKET DATA FOR {pair}..."));

        let ticker = market::fetch_ticker(&ctx.http, &ctx.config.endpoints.market, &pair).await?;
        ctx.console
            .output(format!("[{}]: {}", ticker.pair, format_usd(ticker.price)));

        // Optional 1-minute candle window, e.g. `price BTCUSDT 25`.
        if let Some(window) = args.get(1).and_then(|a| a.parse::<usize>().ok()) {
            let window = window.clamp(MIN_WINDOW, MAX_WINDOW);
            let candles =
                market::fetch_klines(&ctx.http, &ctx.config.endpoints.market, &pair, window)
                    .await?;
            match candle_summary(&candles) {
                Some(summary) => ctx.console.output(summary),
                None => ctx.console.warning("NO CANDLE HISTORY RETURNED."),
            }
        }
        Ok(Flow::Continue)
    }
}

/// One-line summary of a candle window.
fn candle_summary(candles: &[market::Candle]) -> Option<String> {
    let first = candles.first()?;
    let last = candles.last()?;
    let high = candles.iter().map(|c| c.close).fold(f64::MIN, f64::max);
    let low = candles.iter().map(|c| c.close).fold(f64::MAX, f64::min);
    Some(format!(
        "[1M WINDOW x{}]: OPEN {} | HIGH {} | LOW {} | CLOSE {}",
        candles.len(),
        format_usd(first.close),
        format_usd(high),
        format_usd(low),
        format_usd(last.close),
    ))
}

// ---------------------------------------------------------------------------
// ledger
// ---------------------------------------------------------------------------

struct LedgerCmd;

#[async_trait]
impl Command for LedgerCmd {
    fn name(&self) -> &str {
        "ledger"
    }
    fn description(&self) -> &str {
        "Audit a BTC address on-chain"
    }
    fn usage(&self) -> &str {
        "ledger [address]"
    }
    fn target_rule(&self) -> TargetRule {
        TargetRule::Required {
            example: "ledger 1BoatSLRHtKNngkdXEeobR76b53LETtpyT",
        }
    }
    async fn execute(&self, target: Option<&str>, _args: &[String], ctx: &Context) -> Result<Flow> {
        let address = target.unwrap_or_default();
        ctx.console.system(format!("AUDITING LEDGER FOR {address}..."));

        let timeout = Duration::from_secs(ctx.config.http.bounded_timeout_secs);
        let profile =
            blockcypher::lookup(&ctx.http, &ctx.config.endpoints.ledger, address, timeout).await?;

        ctx.console
            .output(format!("[BALANCE]: {}", format_btc(profile.balance_sat)));
        ctx.console.output(format!(
            "[RECEIVED]: {}",
            format_btc(profile.total_received_sat)
        ));
        ctx.console
            .output(format!("[SENT]: {}", format_btc(profile.total_sent_sat)));
        ctx.console.output(format!(
            "[TX COUNT]: {} ({} UNCONFIRMED)",
            profile.tx_count, profile.unconfirmed
        ));

        if !profile.recent.is_empty() {
            ctx.console.output("RECENT MOVEMENTS:");
            for line in capped_lines(&profile.recent, ctx.config.display.tx_cap, |t| {
                format!(
                    "[TX]: {} | {} | {}",
                    clip(&t.hash, 16),
                    format_btc(t.value_sat),
                    t.confirmed
                )
            }) {
                ctx.console.output(line);
            }
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::test_support::test_ctx;

    #[test]
    fn candle_summary_covers_extremes() {
        let candles = vec![
            market::Candle {
                open_time_ms: 0,
                close: 10.0,
            },
            market::Candle {
                open_time_ms: 60_000,
                close: 30.0,
            },
            market::Candle {
                open_time_ms: 120_000,
                close: 20.0,
            },
        ];
        let summary = candle_summary(&candles).unwrap();
        assert_eq!(
            summary,
            "[1M WINDOW x3]: OPEN $10.00 | HIGH $30.00 | LOW $10.00 | CLOSE $20.00"
        );
    }

    #[test]
    fn empty_candle_window_has_no_summary() {
        assert!(candle_summary(&[]).is_none());
    }

    #[tokio::test]
    async fn ledger_without_address_fails_validation() {
        let ctx = test_ctx();
        let mut reg = CommandRegistry::new();
        register_market_commands(&mut reg);

        reg.dispatch("ledger", &ctx).await;
        let last = ctx.console.lines().pop().unwrap();
        assert!(last.text.starts_with("[ERROR] REQUIRES TARGET"));
    }
}
