//! Solidity bindings for the SimpleStorage contract.
//!
//! The contract is a fixed external fact: a single `uint256` slot with a
//! getter, a setter and a `ValueUpdated` event emitted on every write.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface ISimpleStorage {
        event ValueUpdated(uint256 newValue);

        function getValue() external view returns (uint256);
        function setValue(uint256 _value) external;
    }
}
