//! Disassembler listings used across the test suite.

/// A debug build with a class-level `All` mode, a method-level `ExecutionTimeOnly` override, a
/// static sink, a constructor and a second class holding a nested class.
pub const PROGRAM: &str = r#"
//  Microsoft (R) .NET IL Disassembler.  Version 8.0.0



// Metadata version: v4.0.30319
.assembly extern System.Runtime
{
  .publickeytoken = (B0 3F 5F 7F 11 D5 0A 3A )                         // .?_....:
  .ver 8:0:0:0
}
.assembly extern System.Console
{
  .publickeytoken = (B0 3F 5F 7F 11 D5 0A 3A )                         // .?_....:
  .ver 8:0:0:0
}
.assembly extern Profiler
{
  .ver 1:0:0:0
}
.assembly Demo
{
  .custom instance void [System.Runtime]System.Runtime.CompilerServices.CompilationRelaxationsAttribute::.ctor(int32) = ( 01 00 08 00 00 00 00 00 ) 
  .hash algorithm 0x00008004
  .ver 1:0:0:0
}
.module Demo.dll
.imagebase 0x00400000
.file alignment 0x00000200
.stackreserve 0x00100000
.subsystem 0x0003       // WINDOWS_CUI
.corflags 0x00000001    //  ILONLY


// =============== CLASS MEMBERS DECLARATION ===================

.class public auto ansi beforefieldinit Demo.Program
       extends [System.Runtime]System.Object
{
  .custom instance void [Profiler]Profiler.ProfilerClassAttribute::.ctor() = ( 01 00 01 00 54 55 14 50 72 6F 66 69 6C 65 72 2E   // ....TU.Profiler.
                                                                               4C 6F 67 67 69 6E 67 4D 6F 64 65 0B 4C 6F 67 67   // LoggingMode.Logg
                                                                               69 6E 67 54 79 70 65 00 00 00 00 )                // ingType....
  .method public hidebysig static void  Process(int32 count,
                                                string[] items) cil managed
  {
    // Code size       18 (0x12)
    .maxstack  2
    .locals init ([0] int32 total,
             [1] bool V_1)
    IL_0000:  nop
    IL_0001:  ldarg.0
    IL_0002:  stloc.0
    IL_0003:  ldloc.0
    IL_0004:  ldc.i4.0
    IL_0005:  cgt
    IL_0007:  stloc.1
    IL_0008:  ldloc.1
    IL_0009:  brfalse.s  IL_0011
    IL_000b:  ldloc.0
    IL_000c:  call       void [System.Console]System.Console::WriteLine(int32)
    IL_0011:  ret
  } // end of method Program::Process

  .method public hidebysig instance int32 
          Add(int32 a,
              int32 b) cil managed
  {
    .custom instance void [Profiler]Profiler.ProfilerMethodAttribute::.ctor() = ( 01 00 01 00 54 08 0B 4C 6F 67 67 69 6E 67 54 79   // ....T..LoggingTy
                                                                                  70 65 01 00 00 00 )                               // pe....
    // Code size       9 (0x9)
    .maxstack  2
    .locals init ([0] int32 V_0)
    IL_0000:  nop
    IL_0001:  ldarg.1
    IL_0002:  ldarg.2
    IL_0003:  add
    IL_0004:  stloc.0
    IL_0005:  br.s       IL_0007

    IL_0007:  ldloc.0
    IL_0008:  ret
  } // end of method Program::Add

  .method public hidebysig static void  LogIt(string methodName,
                                              string parameters,
                                              int64 elapsedMilliseconds) cil managed
  {
    .custom instance void [Profiler]Profiler.LoggingMethodOverrideAttribute::.ctor() = ( 01 00 00 00 ) 
    // Code size       9 (0x9)
    .maxstack  8
    IL_0000:  nop
    IL_0001:  ldarg.0
    IL_0002:  call       void [System.Console]System.Console::WriteLine(string)
    IL_0007:  nop
    IL_0008:  ret
  } // end of method Program::LogIt

  .method public hidebysig specialname rtspecialname 
          instance void  .ctor() cil managed
  {
    // Code size       8 (0x8)
    .maxstack  8
    IL_0000:  ldarg.0
    IL_0001:  call       instance void [System.Runtime]System.Object::.ctor()
    IL_0006:  nop
    IL_0007:  ret
  } // end of method Program::.ctor

} // end of class Demo.Program

.class public auto ansi beforefieldinit Demo.Helper
       extends [System.Runtime]System.Object
{
  .class nested private auto ansi beforefieldinit Cache
         extends [System.Runtime]System.Object
  {
    .method public hidebysig static void  Clear() cil managed
    {
      // Code size       1 (0x1)
      .maxstack  8
      IL_0000:  ret
    } // end of method Cache::Clear

  } // end of class Cache

  .method public hidebysig specialname rtspecialname 
          instance void  .ctor() cil managed
  {
    // Code size       7 (0x7)
    .maxstack  8
    IL_0000:  ldarg.0
    IL_0001:  call       instance void [System.Runtime]System.Object::.ctor()
    IL_0006:  ret
  } // end of method Helper::.ctor

} // end of class Demo.Helper


// =============================================================

// *********** DISASSEMBLY COMPLETE ***********************
"#;

/// A release build: wrapped declaration, no `nop` at entry, no locals, and no sink.
pub const WRAPPED_HEADERS: &str = r#".assembly extern System.Runtime
{
  .ver 8:0:0:0
}
.assembly Filters
{
  .ver 1:0:0:0
}
.module Filters.dll

.class public auto ansi beforefieldinit Demo.Filters
       extends [System.Runtime]System.Object
{
  .custom instance void [Profiler]Profiler.ProfilerClassAttribute::.ctor() = ( 01 00 01 00 54 08 0B 4C 6F 67 67 69 6E 67 54 79 70 65 00 00 00 00 ) 
  .method public hidebysig static class [System.Runtime]System.Collections.Generic.IEnumerable`1<string> 
          Filter(int32 count) cil managed
  {
    // Code size       7 (0x7)
    .maxstack  1
    IL_0000:  ldarg.0
    IL_0001:  call       class [System.Runtime]System.Collections.Generic.IEnumerable`1<string> Demo.Filters::Build(int32)
    IL_0006:  ret
  } // end of method Filters::Filter

  .method public hidebysig instance void  Tick() cil managed
  {
    // Code size       1 (0x1)
    .maxstack  8
    IL_0000:  ret
  } // end of method Filters::Tick

} // end of class Demo.Filters
"#;

/// An instance sink declared in a value type, called from instance methods of that type only.
pub const INSTANCE_SINK: &str = r#".assembly extern System.Runtime
{
  .ver 8:0:0:0
}
.assembly Counters
{
  .ver 1:0:0:0
}

.class public sequential ansi sealed beforefieldinit Demo.Counter
       extends [System.Runtime]System.ValueType
{
  .custom instance void [Profiler]Profiler.ProfilerClassAttribute::.ctor() = ( 01 00 01 00 54 08 0B 4C 6F 67 67 69 6E 67 54 79 70 65 00 00 00 00 ) 
  .method public hidebysig instance void  Bump(class [System.Runtime]System.Collections.Generic.List`1<int32> values) cil managed
  {
    // Code size       2 (0x2)
    .maxstack  8
    IL_0000:  nop
    IL_0001:  ret
  } // end of method Counter::Bump

  .method public hidebysig static void  Reset(valuetype Demo.Counter& counter) cil managed
  {
    // Code size       2 (0x2)
    .maxstack  8
    IL_0000:  nop
    IL_0001:  ret
  } // end of method Counter::Reset

  .method public hidebysig instance void  Record(string methodName,
                                                 string parameters,
                                                 int64 elapsedMilliseconds) cil managed
  {
    .custom instance void [Profiler]Profiler.LoggingMethodOverrideAttribute::.ctor() = ( 01 00 00 00 ) 
    // Code size       2 (0x2)
    .maxstack  8
    IL_0000:  nop
    IL_0001:  ret
  } // end of method Counter::Record

} // end of class Demo.Counter
"#;
