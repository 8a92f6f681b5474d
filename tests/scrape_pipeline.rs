//! End-to-end pipeline tests
//!
//! Feed a canned status page through parse, decode and publish, then assert
//! on the resulting registry and on the exposition endpoint.

use std::sync::Arc;

use axum_test::TestServer;

use docsis_exporter::{
    decoder::{RowDecoder, StatusPage},
    metrics::{ModemMetrics, test_support::gauge_value},
    models::ChannelVariant,
    poller::publish_status_page,
    web::{AppState, create_router},
};

const STATUS_FIXTURE: &str = r#"
    <html><body>
    <h1>Cable Connection</h1>
    <table id="dsTable"><tbody>
      <tr><td>Channel</td><td>Lock Status</td><td>Modulation</td><td>Channel ID</td>
          <td>Frequency</td><td>Power</td><td>SNR/MER</td><td>Unerrored Codewords</td>
          <td>Correctable Codewords</td><td>Uncorrectable Codewords</td></tr>
      <tr><td>1</td><td>Locked</td><td>QAM256</td><td>5</td><td>615000000Hz</td>
          <td>5.1dBmV</td><td>40.1dB</td><td>1000</td><td>2</td><td>0</td></tr>
    </tbody></table>
    <table id="usTable"><tbody>
      <tr><td>Channel</td><td>Lock Status</td><td>Modulation</td><td>Channel ID</td>
          <td>Frequency</td><td>Power</td></tr>
      <tr><td>1</td><td>Locked</td><td>ATDMA</td><td>3</td><td>30000000 Hz</td>
          <td>44.8 dBmV</td></tr>
      <tr><td>2</td><td>Not Locked</td><td>ATDMA</td><td>4</td><td>0 Hz</td>
          <td>0 dBmV</td></tr>
    </tbody></table>
    <table id="d31dsTable"><tbody>
      <tr><td>Channel</td><td>Lock Status</td><td>Profile</td><td>Channel ID</td>
          <td>Frequency</td><td>Power</td><td>SNR/MER</td><td>Subcarriers</td>
          <td>Unerrored</td><td>Correctable</td><td>Uncorrectable</td></tr>
      <tr><td>1</td><td>Locked</td><td>2</td><td>193</td><td>722000000 Hz</td>
          <td>3.9 dBmV</td><td>41.3 dB</td><td>1108 ~ 2987</td><td>33983</td>
          <td>7</td><td>1</td></tr>
    </tbody></table>
    <table id="d31usTable"><tbody>
      <tr><td>Channel</td><td>Lock Status</td><td>Profile</td><td>Channel ID</td>
          <td>Frequency</td><td>Power</td></tr>
      <tr><td>1</td><td>Locked</td><td>2</td><td>99</td><td>36000000 Hz</td>
          <td>42.5 dBmV</td></tr>
    </tbody></table>
    </body></html>
"#;

fn publish_fixture(metrics: &ModemMetrics) -> usize {
    let page = StatusPage::parse(STATUS_FIXTURE).unwrap();
    publish_status_page(&page, &RowDecoder::default(), metrics)
}

#[test]
fn end_to_end_downstream_bonded_gauges() {
    let metrics = ModemMetrics::new().unwrap();
    let published = publish_fixture(&metrics);
    assert_eq!(published, 5);

    assert_eq!(
        gauge_value(&metrics, "channel_lock_status", "5", "bonded", "downstream"),
        Some(1.0)
    );
    assert_eq!(
        gauge_value(&metrics, "channel_frequency_hz", "5", "bonded", "downstream"),
        Some(615_000_000.0)
    );
    assert_eq!(
        gauge_value(&metrics, "channel_power_dbmv", "5", "bonded", "downstream"),
        Some(5.1)
    );
    assert_eq!(
        gauge_value(&metrics, "channel_snr_mer", "5", "bonded", "downstream"),
        Some(40.1)
    );
    assert_eq!(
        gauge_value(
            &metrics,
            "channel_unerrored_codewords",
            "5",
            "bonded",
            "downstream"
        ),
        Some(1000.0)
    );
}

#[test]
fn end_to_end_covers_all_four_variants() {
    let metrics = ModemMetrics::new().unwrap();
    publish_fixture(&metrics);

    // upstream bonded, both lock spellings
    assert_eq!(
        gauge_value(&metrics, "channel_lock_status", "3", "bonded", "upstream"),
        Some(1.0)
    );
    assert_eq!(
        gauge_value(&metrics, "channel_lock_status", "4", "bonded", "upstream"),
        Some(0.0)
    );
    // downstream OFDM, codewords shifted past the subcarrier column
    assert_eq!(
        gauge_value(&metrics, "channel_frequency_hz", "193", "ofdm", "downstream"),
        Some(722_000_000.0)
    );
    assert_eq!(
        gauge_value(
            &metrics,
            "channel_correctable_codewords",
            "193",
            "ofdm",
            "downstream"
        ),
        Some(7.0)
    );
    // upstream OFDMA carries no codeword gauges
    assert_eq!(
        gauge_value(&metrics, "channel_power_dbmv", "99", "ofdma", "upstream"),
        Some(42.5)
    );
    assert_eq!(
        gauge_value(&metrics, "channel_snr_mer", "99", "ofdma", "upstream"),
        None
    );
}

#[test]
fn failed_fetch_leaves_gauges_unchanged() {
    let metrics = ModemMetrics::new().unwrap();
    publish_fixture(&metrics);
    metrics.record_scrape_outcome(true);
    let before = gauge_value(&metrics, "channel_frequency_hz", "5", "bonded", "downstream");

    // A failed cycle only touches the failure counter.
    metrics.record_scrape_outcome(false);

    let after = gauge_value(&metrics, "channel_frequency_hz", "5", "bonded", "downstream");
    assert_eq!(before, after);

    let output = metrics.encode().unwrap();
    assert!(output.contains("successful_modem_scrapes 1"));
    assert!(output.contains("unsuccessful_modem_scrapes 1"));
}

#[test]
fn stale_channels_keep_reporting() {
    let metrics = ModemMetrics::new().unwrap();
    publish_fixture(&metrics);

    // Next cycle only sees the downstream table; upstream values persist.
    let shrunk = r#"
        <html><table id="dsTable"><tbody>
        <tr><td>h</td></tr>
        <tr><td>1</td><td>Locked</td><td>QAM256</td><td>5</td><td>616000000 Hz</td>
            <td>5.2 dBmV</td><td>40.2 dB</td><td>1100</td><td>2</td><td>0</td></tr>
        </tbody></table></html>
    "#;
    let page = StatusPage::parse(shrunk).unwrap();
    assert!(page.rows(ChannelVariant::UpstreamBonded).is_empty());
    publish_status_page(&page, &RowDecoder::default(), &metrics);

    assert_eq!(
        gauge_value(&metrics, "channel_frequency_hz", "5", "bonded", "downstream"),
        Some(616_000_000.0)
    );
    assert_eq!(
        gauge_value(&metrics, "channel_power_dbmv", "3", "bonded", "upstream"),
        Some(44.8)
    );
}

#[tokio::test]
async fn metrics_endpoint_serves_exposition_format() {
    let metrics = Arc::new(ModemMetrics::new().unwrap());
    publish_fixture(&metrics);
    metrics.record_scrape_outcome(true);

    let app = create_router(AppState {
        metrics: metrics.clone(),
    });
    let server = TestServer::new(app).unwrap();

    let response = server.get("/metrics").await;
    response.assert_status_ok();
    assert_eq!(
        response.header("content-type"),
        "text/plain; version=0.0.4; charset=utf-8"
    );

    let body = response.text();
    assert!(body.contains("successful_modem_scrapes 1"));
    assert!(body.contains(
        r#"channel_lock_status{channel="5",channel_type="bonded",direction="downstream"} 1"#
    ));
    assert!(body.contains(
        r#"channel_frequency_hz{channel="5",channel_type="bonded",direction="downstream"} 615000000"#
    ));
}

#[tokio::test]
async fn health_endpoint_responds() {
    let metrics = Arc::new(ModemMetrics::new().unwrap());
    let server = TestServer::new(create_router(AppState { metrics })).unwrap();

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.text().contains("healthy"));
}
