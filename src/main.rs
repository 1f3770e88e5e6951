#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;
use rtic::app;

#[app(device = rp_pico::hal::pac, peripherals = true)]
mod app {
    use embedded_hal::digital::v2::InputPin;
    use max7219::MAX7219;
    use rp_pico::hal::{
        clocks::{init_clocks_and_plls, Clock},
        fugit::RateExtU32,
        gpio::{
            bank0::{Gpio13, Gpio14, Gpio15},
            FunctionSio, Pin, PullUp, SioInput,
        },
        pwm::{Channel, FreeRunning, Pwm3, Slice, Slices, A},
        sio::Sio,
        spi::Spi,
        timer::Timer,
        watchdog::Watchdog,
    };

    use pushwheel::app::PushwheelTimer;
    use pushwheel::beeper::PwmTone;
    use pushwheel::input::Buttons;
    use pushwheel::time::wrapping_millis;
    use pushwheel::{Config, Matrix, PushwheelFont};

    // Type definition for the MAX7219 display
    type Spi0 = Spi<rp_pico::hal::spi::Enabled, rp_pico::hal::pac::SPI0, (
        Pin<rp_pico::hal::gpio::bank0::Gpio19, rp_pico::hal::gpio::FunctionSpi, rp_pico::hal::gpio::PullDown>,
        Pin<rp_pico::hal::gpio::bank0::Gpio16, rp_pico::hal::gpio::FunctionSpi, rp_pico::hal::gpio::PullDown>,
        Pin<rp_pico::hal::gpio::bank0::Gpio18, rp_pico::hal::gpio::FunctionSpi, rp_pico::hal::gpio::PullDown>
    )>;
    type CsPin = Pin<rp_pico::hal::gpio::bank0::Gpio17, rp_pico::hal::gpio::FunctionSio<rp_pico::hal::gpio::SioOutput>, rp_pico::hal::gpio::PullDown>;
    type DisplayType = MAX7219<max7219::connectors::SpiConnectorSW<Spi0, CsPin>>;

    type StartPin = Pin<Gpio13, FunctionSio<SioInput>, PullUp>;
    type SetPin = Pin<Gpio14, FunctionSio<SioInput>, PullUp>;
    type ResetPin = Pin<Gpio15, FunctionSio<SioInput>, PullUp>;
    type Buzzer = PwmTone<Channel<Slice<Pwm3, FreeRunning>, A>>;

    type Panel = PushwheelTimer<StartPin, SetPin, ResetPin, Buzzer, PushwheelFont>;

    /// Number of chained 8x8 modules
    const MODULES: usize = 4;

    // Buzzer pitch: 125 MHz / 64 / (976 + 1) ~= 2 kHz
    const BUZZER_DIV: u8 = 64;
    const BUZZER_TOP: u16 = 976;

    #[shared]
    struct Shared {}

    // Everything is driven from the single control loop in `idle`
    #[local]
    struct Local {
        matrix: Matrix<DisplayType, MODULES>,
        panel: Panel,
        timer: Timer,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        defmt::info!("pushwheel timer starting");
        let config = Config::DEFAULT;

        let mut pac = ctx.device;
        let mut watchdog = Watchdog::new(pac.WATCHDOG);
        let sio = Sio::new(pac.SIO);

        let clocks = init_clocks_and_plls(
            rp_pico::XOSC_CRYSTAL_FREQ,
            pac.XOSC,
            pac.CLOCKS,
            pac.PLL_SYS,
            pac.PLL_USB,
            &mut pac.RESETS,
            &mut watchdog,
        )
        .ok()
        .unwrap();

        let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

        let pins = rp_pico::Pins::new(
            pac.IO_BANK0,
            pac.PADS_BANK0,
            sio.gpio_bank0,
            &mut pac.RESETS,
        );

        let mosi = pins.gpio19.into_function::<rp_pico::hal::gpio::FunctionSpi>();
        let sck = pins.gpio18.into_function::<rp_pico::hal::gpio::FunctionSpi>();
        let miso = pins.gpio16.into_function::<rp_pico::hal::gpio::FunctionSpi>();
        let cs = pins.gpio17.into_push_pull_output();

        let spi = Spi::<_, _, _, 8>::new(pac.SPI0, (mosi, miso, sck));
        let spi = spi.init(
            &mut pac.RESETS,
            clocks.peripheral_clock.freq(),
            2_000_000u32.Hz(),
            &embedded_hal::spi::MODE_0,
        );

        let mut display = MAX7219::from_spi_cs(MODULES, spi, cs).unwrap();
        display.power_on().unwrap();
        for i in 0..MODULES {
            display.set_intensity(i, config.intensity).unwrap();
            display.clear_display(i).unwrap();
        }
        let matrix = Matrix::new(display);

        let start: StartPin = pins.gpio13.into_pull_up_input();
        let set: SetPin = pins.gpio14.into_pull_up_input();
        let reset: ResetPin = pins.gpio15.into_pull_up_input();
        if start.is_low().unwrap_or(false) {
            defmt::warn!("start button held at power-on");
        }
        let buttons = Buttons::new(start, set, reset, config.debounce);

        let pwm_slices = Slices::new(pac.PWM, &mut pac.RESETS);
        let mut pwm = pwm_slices.pwm3;
        pwm.set_div_int(BUZZER_DIV);
        pwm.set_top(BUZZER_TOP);
        pwm.enable();
        let mut channel = pwm.channel_a;
        channel.output_to(pins.gpio22);
        let buzzer = PwmTone::new(channel);

        let panel = PushwheelTimer::new(config, buttons, buzzer, PushwheelFont);
        defmt::info!("config: {}", config);

        (
            Shared {},
            Local {
                matrix,
                panel,
                timer,
            },
            init::Monotonics(),
        )
    }

    // Control loop: buttons, countdown, beeper, wheels, forever
    #[idle(local = [matrix, panel, timer])]
    fn idle(ctx: idle::Context) -> ! {
        let matrix = ctx.local.matrix;
        let panel = ctx.local.panel;
        let timer = ctx.local.timer;

        let mut was_settled = false;
        loop {
            let now = wrapping_millis(timer.get_counter().duration_since_epoch());
            let settled = panel.poll(now, matrix);
            if settled != was_settled {
                defmt::trace!("display settled: {}", settled);
                was_settled = settled;
            }
        }
    }
}
