#[allow(clippy::too_many_arguments)]
pub mod jackpot {
    alloy::sol!(
        /// Jackpot lottery contract, as consumed by the client.
        #[derive(Debug)]
        #[sol(rpc)]
        interface Jackpot {
            function totalPool() external view returns (uint256);
            function getJackpotUsd() external view returns (uint256);
            function TARGET_USD() external view returns (uint256);
            function last24hDepositUsd() external view returns (uint256);
            function userDeposits(address user) external view returns (uint256);
            function winner() external view returns (address);
            function canDraw() external view returns (bool);
            function holdStartTimestamp() external view returns (uint256);

            function deposit() external payable;
            function withdrawIfWinner() external;
            function requestDraw() external;
            function withdrawFees() external;
        }
    );
}
