//! End-to-end flow through the core crate: store → fill → host → report.

use chrono::{NaiveDate, NaiveDateTime};
use lotsim_core::data::{fill_missing, CsvStore};
use lotsim_core::engine::{Backtest, Market, StockData, Strategy};
use lotsim_core::ledger::{Account, CostModel, LedgerError};
use lotsim_core::report;
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::TempDir;

fn ts(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2015, 6, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Reference index trades every day; the stock skips day 3 (suspension).
fn write_fixtures(dir: &TempDir) {
    let index = dir.path().join("000001.sz-1Day.csv");
    let mut file = std::fs::File::create(index).unwrap();
    writeln!(file, "datetime,open,close,high,low,volume").unwrap();
    for (day, close) in [(1, 100.0), (2, 101.0), (3, 102.0), (4, 103.0), (5, 104.0)] {
        writeln!(
            file,
            "2015-06-{day:02},{close},{close},{close},{close},100000"
        )
        .unwrap();
    }

    let stock = dir.path().join("600000.pfyh-1Day.csv");
    let mut file = std::fs::File::create(stock).unwrap();
    writeln!(file, "datetime,open,close,high,low,volume").unwrap();
    for (day, close) in [(1, 10.0), (2, 10.0), (4, 12.0), (5, 11.0)] {
        writeln!(
            file,
            "2015-06-{day:02},{close},{close},{close},{close},5000"
        )
        .unwrap();
    }
}

fn load_market(dir: &TempDir) -> Market {
    let store = CsvStore::new(dir.path());
    let reference = store.load("000001.sz-1Day", ts(1), ts(5), 0).unwrap();
    let axis: Vec<NaiveDateTime> = reference.reported().iter().map(|b| b.ts).collect();

    let series = store.load("600000.pfyh-1Day", ts(1), ts(5), 0).unwrap();
    let missing = fill_missing(&series, &axis);
    let mut stock = StockData::default();
    stock.insert(series, missing);

    let mut stocks = BTreeMap::new();
    stocks.insert("600000".to_string(), stock);
    Market::new(stocks, axis)
}

/// Buys on day 2 at the close, sells everything on day 5.
struct BuyDay2SellDay5;

impl Strategy for BuyDay2SellDay5 {
    fn name(&self) -> &str {
        "buy_day2_sell_day5"
    }

    fn description(&self) -> &str {
        "Buy the full cash balance on day 2, liquidate on day 5."
    }

    fn compute_trading_points(
        &self,
        market: &Market,
        account: &mut Account,
        _lookback: usize,
    ) -> Result<(), LedgerError> {
        let stock = market.stock("600000").expect("stock loaded");
        let buy_close = stock.close_at(ts(2)).expect("day 2 close");
        let receipt = account.buy_by_ratio("600000", buy_close, ts(2), 1.0)?;

        let sell_close = stock.close_at(ts(5)).expect("day 5 close");
        account.sell("600000", sell_close, ts(5), receipt.lots)?;
        Ok(())
    }
}

#[test]
fn full_backtest_produces_consistent_report() {
    let dir = TempDir::new().unwrap();
    write_fixtures(&dir);

    let market = load_market(&dir);
    let account = Account::new(10_000.0, CostModel::free());
    let mut backtest = Backtest::new(market, account, 0);

    let outcome = backtest.run(&BuyDay2SellDay5);
    assert!(outcome.aborted().is_none());

    let (market, account) = backtest.into_parts();
    let report = report::generate(&account, &market);

    // 10 lots bought at 10.0, sold at 11.0 → +1000 with no costs
    assert!((account.cash() - 11_000.0).abs() < 1e-9);
    let perf = report.stats.performance.as_ref().unwrap();
    assert!((perf.profit - 1_000.0).abs() < 1e-9);
    assert!((perf.simple_return - 0.1).abs() < 1e-12);

    // the curve covers every reference day, including the suspension day,
    // where the position is valued at the carried-forward close
    assert_eq!(report.curve.len(), 5);
    let day3 = &report.curve[2];
    assert_eq!(day3.ts, ts(3));
    assert!((day3.equity - 10_000.0).abs() < 1e-9);

    // day 4 marks the position at the real close of 12.0
    assert!((report.curve[3].equity - 12_000.0).abs() < 1e-9);
}

#[test]
fn report_is_idempotent_across_generations() {
    let dir = TempDir::new().unwrap();
    write_fixtures(&dir);

    let market = load_market(&dir);
    let account = Account::new(10_000.0, CostModel::default());
    let mut backtest = Backtest::new(market, account, 0);
    backtest.run(&BuyDay2SellDay5);

    let (market, account) = backtest.into_parts();
    let first = report::generate(&account, &market);
    let second = report::generate(&account, &market);
    assert_eq!(first, second);
}
