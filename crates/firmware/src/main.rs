//! OTR radio firmware - hardware entry point (RP2040 / Tiny2040).
//!
//! Pin map:
//!   GP0  = UART0 TX -> decoder RX (9600 8N1)
//!   GP1  = UART0 RX <- boot console (SET command window)
//!   GP2  = PWM audio out (slice 1 channel A) -> amp
//!   GP3  = navigation button, active low, internal pull-up
//!   GP4  = I2C0 SDA (DS3231 + AT24C32 module)
//!   GP5  = I2C0 SCL
//!   GP6  = power sense, high = radio dial switched on
//!   GP7  = decoder busy, low = playing, internal pull-up
//!   GP26 = ADC0 volume pot wiper

#![no_std]
#![no_main]

use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc, Channel as AdcChannel};
use embassy_rp::bind_interrupts;
use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{FLASH, I2C0, UART0};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{self, Uart, UartRx};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Ticker, Timer};
use static_cell::StaticCell;

use platform::serial::IoPort;
use platform::{AnalogIn, At24c32, DigitalIn, Ds3231, LineConsole, PwmLevelOut, Storage};
use playback::{IntroEngine, WavAsset, SILENCE_LEVEL};

use firmware::boot::{establish_clock, load_schedule, reconcile_state, wait_power_on};
use firmware::player::RadioPlayer;
use firmware::{config, Radio};
use persist::{checksum16, PersistManager, FLAG_TIME_SOURCE_SET};

use defmt_rtt as _;
use panic_probe as _;

bind_interrupts!(struct Irqs {
    UART0_IRQ => uart::InterruptHandler<UART0>;
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
    ADC_IRQ_FIFO => adc::InterruptHandler;
});

/// Tiny2040 carries 8 MB of QSPI flash.
const FLASH_SIZE: usize = 8 * 1024 * 1024;
/// Last 4 KB sector holds the primary state record.
const STATE_OFFSET: u32 = (FLASH_SIZE - 4096) as u32;
const SECTOR_SIZE: u32 = 4096;

/// Jingle asset and schedule are baked into the image; the offline tools
/// regenerate them before a release build.
static INTRO_WAV: &[u8] = include_bytes!("../assets/intro.wav");
static SCHEDULE_TEXT: &str = include_str!("../assets/schedule.txt");

static ENGINE: StaticCell<IntroEngine<'static>> = StaticCell::new();
static I2C_BUS: StaticCell<Mutex<NoopRawMutex, I2c<'static, I2C0, i2c::Async>>> =
    StaticCell::new();

/// Active-low input presented as a logical "asserted = high" line.
struct ActiveLow(Input<'static>);

impl DigitalIn for ActiveLow {
    fn is_high(&mut self) -> bool {
        self.0.is_low()
    }
}

/// Plain input line.
struct Line(Input<'static>);

impl DigitalIn for Line {
    fn is_high(&mut self) -> bool {
        self.0.is_high()
    }
}

/// Audio PWM: 16-bit logical duty mapped onto a 10-bit carrier.
struct AudioPwm {
    pwm: Pwm<'static>,
    cfg: PwmConfig,
}

const PWM_TOP: u16 = 0x03FF;

impl AudioPwm {
    fn new(mut pwm: Pwm<'static>) -> Self {
        let mut cfg = PwmConfig::default();
        cfg.top = PWM_TOP;
        cfg.compare_a = PWM_TOP / 2;
        pwm.set_config(&cfg);
        Self { pwm, cfg }
    }
}

impl PwmLevelOut for AudioPwm {
    fn set_level(&mut self, duty: u16) {
        self.cfg.compare_a = duty >> 6;
        self.pwm.set_config(&self.cfg);
    }
}

/// Boot console over UART0 RX: bytes until CR or LF make a line.
struct UartConsole(UartRx<'static, UART0, uart::Async>);

impl LineConsole for UartConsole {
    type Error = uart::Error;

    async fn read_line(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut len = 0usize;
        loop {
            let mut byte = [0u8; 1];
            self.0.read(&mut byte).await?;
            match byte[0] {
                b'\r' | b'\n' => {
                    if len > 0 {
                        return Ok(len);
                    }
                }
                b => {
                    if len < buf.len() {
                        buf[len] = b;
                        len += 1;
                    }
                }
            }
        }
    }
}

/// Primary-tier storage: the state record lives in the last flash sector
/// as `[len_lo, len_hi, bytes...]`; the schedule is served from the baked
/// image. Erased flash (length 0xFFFF) reads as missing.
struct FlashStorage {
    flash: Flash<'static, FLASH, Blocking, FLASH_SIZE>,
}

#[derive(Debug)]
enum FlashStorageError {
    NoSuchFile,
    TooLarge,
    Flash(embassy_rp::flash::Error),
}

impl From<embassy_rp::flash::Error> for FlashStorageError {
    fn from(e: embassy_rp::flash::Error) -> Self {
        Self::Flash(e)
    }
}

impl FlashStorage {
    fn state_len(&mut self) -> Result<Option<usize>, FlashStorageError> {
        let mut hdr = [0u8; 2];
        self.flash.blocking_read(STATE_OFFSET, &mut hdr)?;
        let len = usize::from(u16::from_le_bytes(hdr));
        if len == 0xFFFF || len > (SECTOR_SIZE as usize - 2) {
            return Ok(None);
        }
        Ok(Some(len))
    }
}

impl Storage for FlashStorage {
    type Error = FlashStorageError;

    async fn read_file(&mut self, path: &str, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if path == config::SCHEDULE_PATH {
            let bytes = SCHEDULE_TEXT.as_bytes();
            if bytes.len() > buf.len() {
                return Err(FlashStorageError::TooLarge);
            }
            buf[..bytes.len()].copy_from_slice(bytes);
            return Ok(bytes.len());
        }
        if path != persist::PRIMARY_STATE_PATH {
            return Err(FlashStorageError::NoSuchFile);
        }
        let Some(len) = self.state_len()? else {
            return Err(FlashStorageError::NoSuchFile);
        };
        if len > buf.len() {
            return Err(FlashStorageError::TooLarge);
        }
        // Flash reads must be 4-byte multiples; round up into a scratch.
        let mut scratch = [0u8; 1024];
        let padded = (len + 2 + 3) & !3;
        if padded > scratch.len() {
            return Err(FlashStorageError::TooLarge);
        }
        self.flash.blocking_read(STATE_OFFSET, &mut scratch[..padded])?;
        buf[..len].copy_from_slice(&scratch[2..2 + len]);
        Ok(len)
    }

    async fn write_file(&mut self, path: &str, data: &[u8]) -> Result<(), Self::Error> {
        if path != persist::PRIMARY_STATE_PATH {
            return Err(FlashStorageError::NoSuchFile);
        }
        let mut record = [0xFFu8; 1024];
        let total = data.len() + 2;
        if total > record.len() {
            return Err(FlashStorageError::TooLarge);
        }
        record[..2].copy_from_slice(&(data.len() as u16).to_le_bytes());
        record[2..total].copy_from_slice(data);
        let padded = (total + 3) & !3;
        self.flash
            .blocking_erase(STATE_OFFSET, STATE_OFFSET + SECTOR_SIZE)?;
        self.flash.blocking_write(STATE_OFFSET, &record[..padded])?;
        Ok(())
    }

    async fn exists(&mut self, path: &str) -> Result<bool, Self::Error> {
        if path == config::SCHEDULE_PATH {
            return Ok(true);
        }
        if path != persist::PRIMARY_STATE_PATH {
            return Ok(false);
        }
        Ok(self.state_len()?.is_some())
    }

    async fn modified_unix(&mut self, _path: &str) -> Result<u32, Self::Error> {
        // Flash carries no timestamps; the schedule fingerprint falls back
        // to the checksum alone.
        Ok(0)
    }
}

/// Feeds the sample engine at the asset rate. After the jingle finishes
/// (or is halted) the pin parks at the silence midpoint.
#[embassy_executor::task]
async fn jingle_task(engine: &'static IntroEngine<'static>, mut pwm: AudioPwm) {
    let period = Duration::from_micros(1_000_000 / u64::from(engine.sample_rate().max(1)));
    let mut ticker = Ticker::every(period);
    loop {
        if engine.is_finished() {
            pwm.set_level(SILENCE_LEVEL);
        } else {
            engine.tick(&mut pwm);
        }
        ticker.next().await;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    defmt::info!("otr-radio firmware v{=str}", env!("CARGO_PKG_VERSION"));
    let p = embassy_rp::init(Default::default());

    // Decoder serial link + boot console share UART0.
    let mut uart_config = uart::Config::default();
    uart_config.baudrate = 9600;
    let uart = Uart::new(
        p.UART0,
        p.PIN_0, // TX
        p.PIN_1, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (uart_tx, uart_rx) = uart.split();
    let mut console = UartConsole(uart_rx);

    let mut button = ActiveLow(Input::new(p.PIN_3, Pull::Up));
    // The busy line is consumed at its physical level (low = playing).
    let busy = Line(Input::new(p.PIN_7, Pull::Up));
    let mut power_sense = Line(Input::new(p.PIN_6, Pull::Down));

    // Shared I2C0 bus: DS3231 clock + AT24C32 EEPROM.
    let i2c = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c::Config::default());
    let i2c_bus: &'static Mutex<NoopRawMutex, _> = I2C_BUS.init(Mutex::new(i2c));

    // Audio PWM on GP2, parked at the midpoint until the jingle arms.
    let pwm = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_2, PwmConfig::default());
    let audio = AudioPwm::new(pwm);

    let adc = Adc::new(p.ADC, Irqs, adc::Config::default());
    let pot_channel = AdcChannel::new_pin(p.PIN_26, Pull::None);
    let pot = PotIn { adc, channel: pot_channel };

    let mut storage = FlashStorage {
        flash: Flash::new_blocking(p.FLASH),
    };

    // The cabinet's dial switch gates everything.
    defmt::info!("waiting for power sense");
    wait_power_on(&mut power_sense).await;

    // Holding the button through power-on forces the clock console open.
    let force_console = config::FORCE_CLOCK_CONSOLE || button.is_high();

    let mut rtc = Ds3231::new(I2cDevice::new(i2c_bus));
    let clock = establish_clock(
        &mut rtc,
        &mut console,
        force_console,
        Duration::from_millis(config::CLOCK_CONSOLE_WINDOW_MS),
    )
    .await;
    defmt::info!("clock status: trusted={=bool}", clock.is_trusted());

    let mut eeprom = At24c32::detect(I2cDevice::new(i2c_bus)).await;
    match &eeprom {
        Some(e) => defmt::info!("EEPROM found at 0x{=u8:x}", e.device_addr()),
        None => defmt::warn!("no EEPROM, secondary tier disabled"),
    }

    // Schedule fingerprint for the secondary record.
    static SCHEDULE_BUF: StaticCell<[u8; 8192]> = StaticCell::new();
    let schedule_buf = SCHEDULE_BUF.init([0u8; 8192]);
    let (schedule_text, schedule_checksum, schedule_mtime) =
        match load_schedule(&mut storage, schedule_buf).await {
            Some(loaded) => loaded,
            None => {
                defmt::warn!("schedule unreadable, alignment disabled");
                ("", checksum16(b""), 0)
            }
        };
    let mut manager = PersistManager::new(schedule_checksum, schedule_mtime);

    let loaded = reconcile_state(&mut manager, &mut storage, eeprom.as_mut()).await;
    defmt::info!(
        "resuming at album {=u8} track {=u8}",
        loaded.position.album,
        loaded.position.track
    );
    if clock.is_trusted() {
        manager.flags |= FLAG_TIME_SOURCE_SET;
    }

    // Jingle asset. A malformed asset is the one unrecoverable condition;
    // park here rather than run a silent radio.
    let asset = match WavAsset::parse(INTRO_WAV) {
        Ok(asset) => asset,
        Err(_) => {
            defmt::error!("baked intro.wav is malformed, halting");
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };
    let engine: &'static IntroEngine<'static> =
        ENGINE.init(IntroEngine::new(&asset, config::FADE_OUT_MS));
    defmt::info!(
        "jingle: {=u32} ms at {=u32} Hz",
        engine.duration_ms(),
        engine.sample_rate()
    );
    spawner.must_spawn(jingle_task(engine, audio));

    // Give the decoder its boot time before the first command.
    Timer::after_millis(config::DECODER_BOOT_MS).await;

    let player = RadioPlayer::new(IoPort(uart_tx), busy, config::DECODER_VOLUME);
    let mut radio = Radio::new(
        player,
        loaded,
        manager,
        power_sense,
        button,
        pot,
        storage,
        eeprom,
        rtc,
        clock,
        engine,
        schedule_text,
    );

    radio.realign().await;
    radio.start().await;
    radio.run().await
}

/// Volume pot on ADC0, widened from 12 to 16 bits.
struct PotIn {
    adc: Adc<'static, adc::Async>,
    channel: AdcChannel<'static>,
}

impl AnalogIn for PotIn {
    type Error = adc::Error;

    async fn read_raw(&mut self) -> Result<u16, Self::Error> {
        let raw = self.adc.read(&mut self.channel).await?;
        Ok(raw << 4 | raw >> 8)
    }
}
