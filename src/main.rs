//! AD9361 bring-up application
//!
//! Resets the transceiver, runs the full setup sequence over SPI1 and
//! reports the LO frequencies, then polls the ENSM state and die
//! temperature, blinking the status LED while the chip answers. Runs on an
//! STM32G474 Nucleo wired to an AD9361 evaluation board.

#![no_std]
#![no_main]

use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embassy_time::{Delay, Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use ad9361_driver::params::DigTuneSkip;
use ad9361_driver::{Ad9361, DataPathMonitor, Direction, InitParams, SpiTransport};

/// No FPGA on this board: the data port is never tuned.
struct NoDataPath;

impl DataPathMonitor for NoDataPath {
    fn enable_test_pattern(&mut self, _dir: Direction, _enable: bool) {}

    fn reset_status(&mut self) {}

    fn pattern_ok(&mut self) -> bool {
        false
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("AD9361 bring-up v{}", env!("CARGO_PKG_VERSION"));

    let p = embassy_stm32::init(embassy_stm32::Config::default());

    // Status LED (PA5 is taken by SPI1 SCK, use PC13)
    let mut led = Output::new(p.PC13, Level::Low, Speed::Low);

    // RESETB, active low, held for 1 ms
    let mut reset = Output::new(p.PB0, Level::Low, Speed::Low);
    Timer::after(Duration::from_millis(1)).await;
    reset.set_high();
    Timer::after(Duration::from_millis(1)).await;

    let mut spi_config = spi::Config::default();
    spi_config.frequency = Hertz(10_000_000);
    spi_config.mode = spi::MODE_1;
    let spi = Spi::new_blocking(p.SPI1, p.PA5, p.PA7, p.PA6, spi_config);
    let cs = Output::new(p.PA4, Level::High, Speed::VeryHigh);

    let params = InitParams {
        digital_interface_tune_skip_mode: DigTuneSkip::All,
        ..InitParams::default()
    };
    let mut phy = Ad9361::new(SpiTransport::new(spi, cs), Delay, 0, params);

    if let Err(e) = phy.init() {
        error!("setup failed: {}", e);
        return;
    }
    if let Err(e) = phy.post_setup(&mut NoDataPath) {
        error!("post setup failed: {}", e);
        return;
    }

    match (phy.get_rx_lo_freq(), phy.get_tx_lo_freq()) {
        (Ok(rx), Ok(tx)) => info!("rx lo {} Hz, tx lo {} Hz", rx, tx),
        _ => error!("LO readback failed"),
    }

    loop {
        Timer::after(Duration::from_secs(10)).await;
        match (phy.read_ensm_state(), phy.read_temperature()) {
            (Ok(state), Ok(mdeg)) => {
                info!("ensm {}, die temperature {} mC", state, mdeg);
                led.toggle();
            }
            (Err(e), _) | (_, Err(e)) => {
                error!("status read failed: {}", e);
                led.set_low();
            }
        }
    }
}
