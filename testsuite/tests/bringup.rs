#![no_std]
#![no_main]

use testsuite as _;           // memory layout + panic handler + global logger


// - tests --------------------------------------------------------------------

#[defmt_test::tests]
mod tests {
    use defmt::{assert, assert_eq};

    use openh743::clocks::{Clocks, SysClkSource};
    use openh743::snapshot::RccSnapshot;
    use testsuite::Booted;

    #[init]
    fn init() -> Booted {
        testsuite::init()
    }

    #[test]
    fn board_is_a_singleton() {
        // `init` already took the board
        assert!(openh743::Board::take().is_none(), "second take");
        assert!(openh743::pac::Peripherals::take().is_none(), "second pac take");
    }

    #[test]
    fn voltage_scale_0(state: &mut Booted) {
        assert!(state.pwr.d3cr.read().vosrdy().bit_is_set(), "VOSRDY");
        assert_eq!(state.pwr.d3cr.read().vos().bits(), 0b11, "VOS1");
        assert!(state.syscfg.pwrcr.read().oden().bit_is_set(), "overdrive");
        assert!(state.pwr.cr3.read().ldoen().bit_is_set(), "LDO supply");
    }

    #[test]
    fn sys_ck_runs_from_pll1(state: &mut Booted) {
        let snapshot = RccSnapshot::read(&state.rcc);
        assert!(snapshot.sys_ck_source() == Some(SysClkSource::Pll1));
        assert!(state.rcc.cr.read().hserdy().is_ready(), "HSE");
        assert!(state.rcc.cr.read().pll1rdy().is_ready(), "PLL1");
    }

    #[test]
    fn flash_wait_states(state: &mut Booted) {
        let acr = state.flash.acr.read();
        assert_eq!(acr.latency().bits(), 4, "LATENCY");
        assert_eq!(acr.wrhighfreq().bits(), 2, "WRHIGHFREQ");
    }

    #[test]
    fn registers_match_clock_tree(state: &mut Booted) {
        let live = Clocks::read_back(&state.rcc);
        let clocks = state.clocks;

        assert_eq!(live.sys_ck().raw(), 480_000_000, "SCGU");
        assert_eq!(live.c_ck().raw(),   480_000_000, "Core");
        assert_eq!(live.hclk().raw(),   240_000_000, "AHB1,2,3,4");
        assert_eq!(live.pclk1().raw(),  120_000_000, "APB1");
        assert_eq!(live.ppre1(),        2,           "APB1");
        assert_eq!(live.pclk2().raw(),  120_000_000, "APB2");
        assert_eq!(live.ppre2(),        2,           "APB2");
        assert_eq!(live.pclk3().raw(),  120_000_000, "APB3");
        assert_eq!(live.ppre3(),        2,           "APB3");
        assert_eq!(live.pclk4().raw(),  120_000_000, "APB4");
        assert_eq!(live.ppre4(),        2,           "APB4");

        assert_eq!(defmt::unwrap!(live.hse_ck()).raw(),    25_000_000);
        assert_eq!(defmt::unwrap!(live.hsi_ck()).raw(),    64_000_000);
        assert_eq!(defmt::unwrap!(live.csi_ck()).raw(),     4_000_000);
        assert_eq!(defmt::unwrap!(live.pll1_q_ck()).raw(), 480_000_000);

        assert!(live == clocks, "read back differs from configured tree");
    }

    #[test]
    fn mco_outputs(state: &mut Booted) {
        let live = Clocks::read_back(&state.rcc);

        assert_eq!(defmt::unwrap!(live.mco1_ck()).raw(), 64_000_000, "MCO1 = HSI");
        assert_eq!(defmt::unwrap!(live.mco2_ck()).raw(), 96_000_000, "MCO2 = PLL1_P / 5");
        assert!(state.syscfg.cccsr.read().ready().bit_is_set(), "compensation cell");

        let cfgr = state.rcc.cfgr.read();
        assert_eq!(cfgr.mco1().bits(), 0b000, "MCO1 = HSI");
        assert_eq!(cfgr.mco1pre().bits(), 1, "MCO1PRE");
        assert_eq!(cfgr.mco2().bits(), 0b011, "MCO2 = PLL1_P");
        assert_eq!(cfgr.mco2pre().bits(), 5, "MCO2PRE");
    }
}
