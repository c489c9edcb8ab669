//! Contract Definitions
//!
//! Solidity interfaces used by the harvester, defined with alloy's `sol!` macro.
//! Calls are ABI-encoded here and sent through `ChainClient::call`, so no
//! provider-bound contract instances are generated.
//!
//! Author: AI-Generated
//! Created: 2026-10-14

use alloy::sol;

// ── ERC20 ─────────────────────────────────────────────────────────────

sol! {
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
    }
}

// ── Uniswap V2 ───────────────────────────────────────────────────────

sol! {
    interface IUniswapV2Factory {
        function allPairs(uint256 index) external view returns (address pair);
        function allPairsLength() external view returns (uint256);
    }
}

sol! {
    interface IUniswapV2Pair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
        function token0() external view returns (address);
        function token1() external view returns (address);
        function skim(address to) external;
    }
}
